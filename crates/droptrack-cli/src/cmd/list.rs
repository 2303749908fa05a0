//! `dt list`: show every tracked item with its odds.

use crate::cmd::Session;
use crate::output::{ItemView, OutputMode, render_list};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show items with at least one track still open.
    #[arg(long)]
    pub open: bool,
}

pub fn run_list(args: &ListArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let session = Session::open(data_dir, output)?;
    let views: Vec<ItemView<'_>> = session
        .repo
        .items()
        .iter()
        .filter(|item| !args.open || !item.is_fully_resolved())
        .map(ItemView::new)
        .collect();

    if views.is_empty() && output == OutputMode::Pretty {
        println!("No items yet. Add one with `dt add <name> --drop 1/64 --rare 1/4096`.");
        return Ok(());
    }
    render_list(&views, output)?;
    Ok(())
}
