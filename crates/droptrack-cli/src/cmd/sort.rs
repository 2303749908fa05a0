//! `dt sort`: reorder the collection by name or by rate.
//!
//! Without `--asc`/`--desc` the direction alternates between calls, using
//! the toggle state kept under the `dropToolUi` key.

use crate::cmd::{Session, fail};
use crate::output::{ItemView, OutputMode, render_list};
use crate::ui_state::UiState;
use clap::{Args, Subcommand};
use droptrack_core::EventKind;
use std::path::Path;
use tracing::warn;

#[derive(Args, Debug)]
pub struct SortArgs {
    #[command(subcommand)]
    pub by: SortBy,
}

#[derive(Subcommand, Debug)]
pub enum SortBy {
    /// Sort by item name (locale-aware: case, accents, and kana folded).
    Name(DirectionArgs),

    /// Sort by a track's rate; unset rates go last when ascending.
    Rate {
        /// Which rate to sort by: drop or rare.
        #[arg(long, short, default_value = "drop")]
        kind: EventKind,

        #[command(flatten)]
        direction: DirectionArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct DirectionArgs {
    /// Sort ascending.
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,
}

impl DirectionArgs {
    /// Explicit direction, if one was given.
    pub const fn explicit(&self) -> Option<bool> {
        if self.asc {
            Some(true)
        } else if self.desc {
            Some(false)
        } else {
            None
        }
    }
}

pub fn run_sort(args: &SortArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let mut session = Session::open(data_dir, output)?;
    let mut ui = UiState::load(session.repo.store());

    let result = match &args.by {
        SortBy::Name(direction) => {
            let ascending = match direction.explicit() {
                Some(asc) => {
                    ui.set_name(asc);
                    asc
                }
                None => ui.take_name(),
            };
            session.repo.sort_by_name(ascending)
        }
        SortBy::Rate { kind, direction } => {
            let ascending = match direction.explicit() {
                Some(asc) => {
                    ui.set_rate(*kind, asc);
                    asc
                }
                None => ui.take_rate(*kind),
            };
            session.repo.sort_by_rate(*kind, ascending)
        }
    };
    result.map_err(|e| fail(output, e))?;

    if let Err(err) = ui.save(session.repo.store_mut()) {
        warn!(error = %err, "failed to save sort state");
    }

    let views: Vec<ItemView<'_>> = session.repo.items().iter().map(ItemView::new).collect();
    render_list(&views, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use droptrack_core::repo::{CURRENT_KEY, Repository};
    use droptrack_core::store::{FileStore, KeyValueStore};
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SortArgs,
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut repo = Repository::new(FileStore::new(dir));
        repo.load().iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn sort_args_parse() {
        let w = Wrapper::parse_from(["test", "name", "--desc"]);
        assert!(matches!(w.args.by, SortBy::Name(ref d) if d.explicit() == Some(false)));

        let w = Wrapper::parse_from(["test", "rate", "--kind", "rare"]);
        assert!(matches!(
            w.args.by,
            SortBy::Rate { kind: EventKind::Rare, ref direction } if direction.explicit().is_none()
        ));

        assert!(Wrapper::try_parse_from(["test", "name", "--asc", "--desc"]).is_err());
    }

    #[test]
    fn bare_sort_alternates_direction() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::new(FileStore::new(dir.path()));
        repo.load();
        for name in ["b", "c", "a"] {
            repo.add(name, 8, 8).unwrap();
        }
        drop(repo);

        let args = SortArgs {
            by: SortBy::Name(DirectionArgs::default()),
        };
        run_sort(&args, OutputMode::Json, dir.path()).unwrap();
        assert_eq!(names(dir.path()), ["a", "b", "c"]);
        run_sort(&args, OutputMode::Json, dir.path()).unwrap();
        assert_eq!(names(dir.path()), ["c", "b", "a"]);
    }

    #[test]
    fn rate_sort_with_explicit_direction() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        store
            .set(
                CURRENT_KEY,
                r#"[
                    {"id": "id_1", "name": "none", "dropDenom": 8, "rareDenom": 0},
                    {"id": "id_2", "name": "rare", "dropDenom": 8, "rareDenom": 4096},
                    {"id": "id_3", "name": "common", "dropDenom": 8, "rareDenom": 16}
                ]"#,
            )
            .unwrap();

        let args = SortArgs {
            by: SortBy::Rate {
                kind: EventKind::Rare,
                direction: DirectionArgs {
                    asc: true,
                    desc: false,
                },
            },
        };
        run_sort(&args, OutputMode::Json, dir.path()).unwrap();
        assert_eq!(names(dir.path()), ["common", "rare", "none"]);
    }
}
