//! `dt export`: write a backup envelope of the whole collection.

use crate::cmd::{Session, fail};
use crate::output::{OutputMode, render_success};
use anyhow::Context as _;
use clap::Args;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to stdout).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn run_export(args: &ExportArgs, output: OutputMode, data_dir: &Path) -> anyhow::Result<()> {
    let session = Session::open(data_dir, output)?;
    let text = session
        .repo
        .export_envelope()
        .map_err(|e| fail(output, e))?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write backup to {}", path.display()))?;
            render_success(
                output,
                &format!(
                    "exported {} item(s) to {}",
                    session.repo.items().len(),
                    path.display()
                ),
            )?;
        }
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
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
        args: ExportArgs,
    }

    #[test]
    fn export_args_parse() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.output.is_none());
        let w = Wrapper::parse_from(["test", "-o", "backup.json"]);
        assert_eq!(w.args.output, Some(PathBuf::from("backup.json")));
    }

    #[test]
    fn export_writes_envelope_file() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::new(FileStore::new(dir.path()));
        repo.load();
        repo.add("Boss Key", 64, 256).unwrap();
        drop(repo);

        let target = dir.path().join("backup.json");
        let args = ExportArgs {
            output: Some(target.clone()),
        };
        run_export(&args, OutputMode::Json, dir.path()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["items"][0]["name"], "Boss Key");
        assert!(json["exportedAt"].as_i64().unwrap() > 0);
    }
}
