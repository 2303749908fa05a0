//! `dt rm`: stop tracking an item.

use crate::cmd::{Session, confirm, fail};
use crate::output::{CliError, OutputMode, render, render_error};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Item ID to remove (a unique prefix is enough).
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RmResult {
    id: String,
    name: String,
    ok: bool,
}

pub fn run_rm(args: &RmArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let mut session = Session::open(data_dir, output)?;
    let id = session.resolve(&args.id, output)?;

    if !args.force {
        if let Some(item) = session.repo.get(&id) {
            if !confirm(&format!("Delete {} '{}'?", item.id, item.name))? {
                render_error(output, &CliError::new("cancelled; nothing was removed"))?;
                anyhow::bail!("removal of '{id}' cancelled");
            }
        }
    }

    let Some(removed) = session.repo.remove(&id).map_err(|e| fail(output, e))? else {
        render_error(output, &CliError::not_found(&args.id))?;
        anyhow::bail!("item '{}' not found", args.id);
    };

    let payload = RmResult {
        id: removed.id,
        name: removed.name,
        ok: true,
    };
    render(output, &payload, |r, w| {
        writeln!(w, "✓ removed {} '{}'", r.id, r.name)
    })
}
