//! `dt rate`: change one track's rate, keeping attempts and marks.

use crate::cmd::{Session, fail};
use crate::output::{CliError, ItemView, OutputMode, render_error, render_item};
use clap::Args;
use droptrack_core::EventKind;
use droptrack_core::model::rate::parse_denominator_text;
use std::path::Path;

#[derive(Args, Debug)]
pub struct RateArgs {
    /// Item ID (a unique prefix is enough).
    pub id: String,

    /// Which track to change: drop or rare.
    pub kind: EventKind,

    /// New rate, one of 1/8, 1/16, 1/32, 1/64, 1/128, 1/256, 1/4096.
    pub rate: String,
}

pub fn run_rate(args: &RateArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let denom = parse_denominator_text(&args.rate).map_err(|e| fail(output, e.into()))?;

    let mut session = Session::open(data_dir, output)?;
    let id = session.resolve(&args.id, output)?;

    let Some(item) = session
        .repo
        .change_rate(&id, args.kind, denom)
        .map_err(|e| fail(output, e))?
    else {
        render_error(output, &CliError::not_found(&args.id))?;
        anyhow::bail!("item '{}' not found", args.id);
    };
    render_item(&ItemView::new(&item), output)?;
    Ok(())
}
