//! `dt inc`: record attempts against an item.

use crate::cmd::{Session, fail};
use crate::output::{CliError, ItemView, OutputMode, render_error, render_item};
use clap::Args;
use std::path::Path;
use tracing::debug;

#[derive(Args, Debug)]
pub struct IncArgs {
    /// Item ID (a unique prefix is enough).
    pub id: String,

    /// Number of attempts to add.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub times: u32,
}

pub fn run_inc(args: &IncArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let mut session = Session::open(data_dir, output)?;
    let id = session.resolve(&args.id, output)?;

    // Every attempt is its own persisted mutation: `-n` costs one store write each.
    debug!(%id, times = args.times, "recording attempts");
    let mut latest = None;
    for _ in 0..args.times {
        latest = session
            .repo
            .increment_count(&id)
            .map_err(|e| fail(output, e))?;
    }

    let Some(item) = latest else {
        render_error(output, &CliError::not_found(&args.id))?;
        anyhow::bail!("item '{}' not found", args.id);
    };
    render_item(&ItemView::new(&item), output)?;
    Ok(())
}
