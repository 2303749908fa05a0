//! `dt add`: start tracking a new item.

use crate::cmd::{Session, fail};
use crate::output::{ItemView, OutputMode, render_item};
use clap::Args;
use droptrack_core::error::DropError;
use droptrack_core::model::rate::parse_denominator_text;
use std::path::Path;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Item name.
    pub name: String,

    /// Drop rate, as `64` or `1/64`.
    #[arg(short, long, value_name = "RATE")]
    pub drop: Option<String>,

    /// Rare rate, as `4096` or `1/4096`.
    #[arg(short, long, value_name = "RATE")]
    pub rare: Option<String>,
}

/// Parse an optional rate; a missing rate becomes `0` so the core reports it.
pub fn parse_optional_rate(text: Option<&str>) -> Result<u32, DropError> {
    match text {
        Some(text) => Ok(parse_denominator_text(text)?),
        None => Ok(0),
    }
}

pub fn run_add(args: &AddArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let drop = parse_optional_rate(args.drop.as_deref()).map_err(|e| fail(output, e))?;
    let rare = parse_optional_rate(args.rare.as_deref()).map_err(|e| fail(output, e))?;

    let mut session = Session::open(data_dir, output)?;
    let item = session
        .repo
        .add(&args.name, drop, rare)
        .map_err(|e| fail(output, e))?;

    render_item(&ItemView::new(&item), output)?;
    Ok(())
}
