//! `dt mark`: record that a drop (or the rare drop) happened.
//!
//! Marking freezes the attempt count for that track and cannot be undone
//! short of restoring a backup, so interactive runs ask first.

use crate::cmd::{Session, confirm, fail};
use crate::output::{CliError, ItemView, OutputMode, render_error, render_item};
use clap::Args;
use droptrack_core::{EventKind, MarkOutcome};
use std::path::Path;

#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Item ID (a unique prefix is enough).
    pub id: String,

    /// Which track to mark: drop or rare.
    #[arg(default_value = "drop")]
    pub kind: EventKind,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

pub fn run_mark(args: &MarkArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let mut session = Session::open(data_dir, output)?;
    let id = session.resolve(&args.id, output)?;

    let prompt = session
        .repo
        .get(&id)
        .filter(|item| !item.is_done(args.kind) && !args.force)
        .map(|item| {
            format!(
                "Mark {} for '{}' at {} attempts?",
                args.kind, item.name, item.count
            )
        });
    if let Some(prompt) = prompt {
        if !confirm(&prompt)? {
            render_error(output, &CliError::new("cancelled; nothing was marked"))?;
            anyhow::bail!("marking '{id}' cancelled");
        }
    }

    match session
        .repo
        .mark_event(&id, args.kind)
        .map_err(|e| fail(output, e))?
    {
        MarkOutcome::Marked(item) => {
            render_item(&ItemView::new(&item), output)?;
            Ok(())
        }
        MarkOutcome::AlreadyDone(item) => {
            render_error(
                output,
                &CliError::with_details(
                    format!(
                        "{} already marked for '{}' at {} attempts",
                        args.kind,
                        item.name,
                        item.done_at(args.kind)
                            .map_or_else(|| "unknown".to_string(), |at| at.to_string())
                    ),
                    "Restore a backup with `dt import` to undo a mark.",
                    "already_done",
                ),
            )?;
            anyhow::bail!("{} already marked for '{id}'", args.kind);
        }
        MarkOutcome::NotFound => {
            render_error(output, &CliError::not_found(&args.id))?;
            anyhow::bail!("item '{}' not found", args.id);
        }
    }
}
