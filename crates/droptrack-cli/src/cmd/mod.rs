pub mod add;
pub mod completions;
pub mod export;
pub mod import;
pub mod inc;
pub mod list;
pub mod mark;
pub mod odds;
pub mod rate;
pub mod rm;
pub mod sort;

use crate::output::{CliError, OutputMode, render_error};
use droptrack_core::error::DropError;
use droptrack_core::lock::DataDirLock;
use droptrack_core::repo::{LoadSource, Repository};
use droptrack_core::store::FileStore;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// How long a command waits for another `dt` process to release the data directory.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A loaded repository plus the data-directory lock held for the whole command.
pub struct Session {
    pub repo: Repository<FileStore>,
    _lock: DataDirLock,
}

impl Session {
    /// Lock `data_dir` and load its collection.
    pub fn open(data_dir: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let lock = match DataDirLock::acquire(data_dir, LOCK_TIMEOUT) {
            Ok(lock) => lock,
            Err(err) => {
                render_error(output, &CliError::from(&err))?;
                anyhow::bail!("{err}");
            }
        };

        let mut repo = Repository::new(FileStore::new(data_dir));
        let loaded = repo.load().len();
        if repo.load_source() == LoadSource::MigratedLegacy {
            eprintln!("note: migrated {loaded} item(s) from the previous storage format");
        }
        debug!(data_dir = %data_dir.display(), items = loaded, "opened repository");

        Ok(Self { repo, _lock: lock })
    }

    /// Resolve a user-typed id or report it as not found.
    pub fn resolve(&self, raw_id: &str, output: OutputMode) -> anyhow::Result<String> {
        match self.repo.resolve_id(raw_id) {
            Some(id) => Ok(id.to_string()),
            None => {
                render_error(output, &CliError::not_found(raw_id))?;
                anyhow::bail!("item '{raw_id}' not found");
            }
        }
    }
}

/// Render a core error and turn it into the command's failure.
pub fn fail(output: OutputMode, err: DropError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(&err)) {
        return render_err;
    }
    err.into()
}

/// Ask for confirmation on an interactive terminal; non-interactive runs proceed.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
