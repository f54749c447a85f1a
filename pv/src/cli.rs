//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Provisioner - install and reset pipelines
#[derive(Parser, Debug)]
#[command(
    name = "pv",
    about = "Run application install and reset pipelines",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that runs actions
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Skip confirmation for destructive actions
    #[arg(short, long)]
    pub force: bool,

    /// Print the command lines instead of running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision the application from scratch
    Install {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Reset the database and caches
    Reset {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Publish a single lifecycle step
    Step {
        /// Step name (e.g. runmigrations or command.runmigrations)
        #[arg(value_name = "STEP")]
        step: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List pipelines and the handlers bound to each step
    Steps {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_install_with_flags() {
        let cli = Cli::try_parse_from(["pv", "install", "--force", "--dry-run"]).unwrap();

        match cli.command {
            Command::Install { run } => {
                assert!(run.force);
                assert!(run.dry_run);
            }
            other => panic!("Expected Install, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from(["pv", "reset", "-c", "pv.yml", "-l", "debug"]).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("pv.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Reset { run } if !run.force && !run.dry_run));
    }

    #[test]
    fn test_parse_step() {
        let cli = Cli::try_parse_from(["pv", "step", "genassets", "-n"]).unwrap();

        match cli.command {
            Command::Step { step, run } => {
                assert_eq!(step, "genassets");
                assert!(run.dry_run);
            }
            other => panic!("Expected Step, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_steps_format() {
        let cli = Cli::try_parse_from(["pv", "steps", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Command::Steps { format: OutputFormat::Json }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["pv"]).is_err());
    }
}
