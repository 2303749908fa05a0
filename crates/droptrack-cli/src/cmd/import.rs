//! `dt import`: replace the collection from a backup envelope.
//!
//! Accepts backups from any earlier generation. Nothing is written unless
//! at least one valid item is found.

use crate::cmd::{Session, fail};
use crate::output::{OutputMode, render};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Backup file to read (defaults to stdin).
    #[arg(long, short, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ImportResult {
    imported: usize,
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read backup from {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read backup from stdin")?;
            Ok(text)
        }
    }
}

pub fn run_import(args: &ImportArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let text = read_input(args.input.as_deref())?;

    let mut session = Session::open(data_dir, output)?;
    let imported = session
        .repo
        .import_envelope(&text)
        .map_err(|e| fail(output, e))?;

    render(output, &ImportResult { imported }, |r, w| {
        writeln!(w, "✓ restored {} item(s)", r.imported)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use droptrack_core::repo::Repository;
    use droptrack_core::store::FileStore;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ImportArgs,
    }

    #[test]
    fn import_args_parse() {
        let w = Wrapper::parse_from(["test", "--input", "b.json"]);
        assert_eq!(w.args.input, Some(PathBuf::from("b.json")));
    }

    #[test]
    fn import_replaces_collection() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("backup.json");
        fs::write(
            &backup,
            r#"{"version":1,"items":[{"id":"id_old","name":"Orb","denom":64,"count":5,"dropped":false}]}"#,
        )
        .unwrap();

        let args = ImportArgs {
            input: Some(backup),
        };
        run_import(&args, OutputMode::Json, dir.path()).unwrap();

        let mut repo = Repository::new(FileStore::new(dir.path()));
        let items = repo.load();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].drop_denom, 64);
        assert_eq!(items[0].count, 5);
    }

    #[test]
    fn empty_backup_is_rejected() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("backup.json");
        fs::write(&backup, r#"{"items":[]}"#).unwrap();

        let args = ImportArgs {
            input: Some(backup),
        };
        let err = run_import(&args, OutputMode::Json, dir.path()).unwrap_err();
        assert!(err.to_string().contains("no valid items"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let args = ImportArgs {
            input: Some(dir.path().join("absent.json")),
        };
        let err = run_import(&args, OutputMode::Json, dir.path()).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
