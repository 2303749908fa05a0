#![forbid(unsafe_code)]

mod cmd;
mod output;
mod ui_state;

use clap::{CommandFactory, Parser, Subcommand};
use droptrack_core::config::resolve_config;
use droptrack_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "dt",
    author,
    version,
    about = "droptrack: count attempts against drop rates and see your odds",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Directory holding item data (overrides DROPTRACK_DIR and config).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List tracked items",
        long_about = "List every tracked item with attempts, rates, and the chance of having seen each drop by now.",
        after_help = "EXAMPLES:\n    # Show everything\n    dt list\n\n    # Only items still being farmed\n    dt list --open\n\n    # Emit machine-readable output\n    dt list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Start tracking an item",
        long_about = "Add an item with a drop rate and a rare rate. Rates are written `64` or `1/64`.",
        after_help = "EXAMPLES:\n    # Track a key with 1/64 drop and 1/256 rare rate\n    dt add \"Boss Key\" --drop 1/64 --rare 1/256\n\n    # Emit machine-readable output\n    dt add Orb -d 8 -r 4096 --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Record attempts",
        long_about = "Add one or more attempts to an item's counter.",
        after_help = "EXAMPLES:\n    # One more attempt\n    dt inc id_3f2a\n\n    # Ten attempts at once, using an id prefix\n    dt inc 3f2a -n 10"
    )]
    Inc(cmd::inc::IncArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Mark a drop as seen",
        long_about = "Mark the drop (or rare drop) as seen at the current attempt count. Asks for confirmation on a terminal.",
        after_help = "EXAMPLES:\n    # The item dropped\n    dt mark id_3f2a\n\n    # The rare variant dropped, no prompt\n    dt mark id_3f2a rare --force"
    )]
    Mark(cmd::mark::MarkArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Change a rate",
        long_about = "Change an item's drop or rare rate. Attempts and marks are kept.",
        after_help = "EXAMPLES:\n    # Set the rare rate to 1/4096\n    dt rate id_3f2a rare 1/4096"
    )]
    Rate(cmd::rate::RateArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Stop tracking an item",
        long_about = "Remove an item. Asks for confirmation on a terminal.",
        after_help = "EXAMPLES:\n    # Remove an item\n    dt rm id_3f2a\n\n    # Remove without prompting\n    dt rm id_3f2a --force"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Read",
        about = "Reorder items",
        long_about = "Sort the collection by name or rate and keep the new order. Repeating a sort without --asc/--desc flips its direction.",
        after_help = "EXAMPLES:\n    # Sort by name, then run again to reverse\n    dt sort name\n\n    # Rarest items first\n    dt sort rate --kind rare --desc"
    )]
    Sort(cmd::sort::SortArgs),

    #[command(
        next_help_heading = "Backup",
        about = "Export a backup",
        long_about = "Write every item as a versioned JSON backup.",
        after_help = "EXAMPLES:\n    # Print to stdout\n    dt export\n\n    # Write to a file\n    dt export -o backup.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Backup",
        about = "Restore a backup",
        long_about = "Replace every item with the contents of a backup. Older backup formats are migrated.",
        after_help = "EXAMPLES:\n    # Restore from a file\n    dt import -i backup.json\n\n    # Restore from stdin\n    dt import < backup.json"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Read",
        about = "Compute odds without tracking",
        long_about = "Chance of at least one drop at a given rate after a number of attempts.",
        after_help = "EXAMPLES:\n    # 1/64 after 10 attempts\n    dt odds 1/64 10"
    )]
    Odds(cmd::odds::OddsArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    dt completions bash > ~/.local/share/bash-completion/completions/dt"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DROPTRACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "droptrack=debug,dt=debug,info"
        } else {
            "droptrack=info,warn"
        })
    });

    let format = env::var("DROPTRACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match resolve_config(cli.data_dir.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let mode = resolve_output_mode(cli.format, cli.json, None);
            let code = ErrorCode::ConfigParseError;
            render_error(
                mode,
                &CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(err);
        }
    };
    let output = resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());
    let data_dir = config.data_dir.as_path();
    debug!(data_dir = %data_dir.display(), ?output, "resolved configuration");

    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, output, data_dir),
        Commands::Add(args) => cmd::add::run_add(args, output, data_dir),
        Commands::Inc(args) => cmd::inc::run_inc(args, output, data_dir),
        Commands::Mark(args) => cmd::mark::run_mark(args, output, data_dir),
        Commands::Rate(args) => cmd::rate::run_rate(args, output, data_dir),
        Commands::Rm(args) => cmd::rm::run_rm(args, output, data_dir),
        Commands::Sort(args) => cmd::sort::run_sort(args, output, data_dir),
        Commands::Export(args) => cmd::export::run_export(args, output, data_dir),
        Commands::Import(args) => cmd::import::run_import(args, output, data_dir),
        Commands::Odds(args) => cmd::odds::run_odds(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["dt", "list", "--json"]);
        assert!(cli.json);
        assert!(cli.format.is_none());
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["dt", "--format", "text", "list"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(Cli::try_parse_from(["dt", "--format", "yaml", "list"]).is_err());
    }

    #[test]
    fn data_dir_flag_is_global() {
        let cli = Cli::parse_from(["dt", "inc", "abc", "--data-dir", "/tmp/drops"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/drops")));
    }

    #[test]
    fn verbose_flag_parsed() {
        let cli = Cli::parse_from(["dt", "-v", "list"]);
        assert!(cli.verbose);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["dt", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["dt", "list"],
            vec!["dt", "add", "Boss Key", "--drop", "1/64", "--rare", "1/256"],
            vec!["dt", "inc", "x"],
            vec!["dt", "inc", "x", "-n", "5"],
            vec!["dt", "mark", "x"],
            vec!["dt", "mark", "x", "rare", "--force"],
            vec!["dt", "rate", "x", "drop", "1/128"],
            vec!["dt", "rm", "x", "--force"],
            vec!["dt", "sort", "name"],
            vec!["dt", "sort", "rate", "--kind", "rare", "--desc"],
            vec!["dt", "export", "--output", "b.json"],
            vec!["dt", "import", "--input", "b.json"],
            vec!["dt", "odds", "1/64", "10"],
            vec!["dt", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?}, error: {:?}",
                args,
                result.err()
            );
        }
    }
}
