use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

use botctl::alias::{Alias, Invocation, parse_migration_name};
use botctl::config::CliOverrides;
use botctl::errors::TaskError;

mod cmd;

#[derive(Parser)]
#[command(name = "botctl")]
#[command(
    version,
    about = "Task runner for the bot: build, run, migrate and test through docker compose",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the commands that would run without running them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Directory holding botctl.toml and the compose project (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Service targeted by logs, shell, test and migrations
    #[arg(long, global = true)]
    pub service: Option<String>,

    /// Compose file to use instead of the default (repeatable)
    #[arg(short = 'f', long = "compose-file", global = true)]
    pub compose_files: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build containers for all services
    Build,
    /// Start all services in the background
    Up,
    /// Stop and remove all services
    Down,
    /// Restart all services
    Restart,
    /// Follow logs of the bot service
    Logs {
        /// Extra arguments for the logs command, after `--`
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Autogenerate a new migration
    Migration {
        /// Migration label, written `name=<text>` or `<text>`
        #[arg(value_name = "name=<text>")]
        label: Option<String>,

        /// Migration label
        #[arg(long = "name", value_name = "TEXT", conflicts_with = "label")]
        name: Option<String>,
    },
    /// Apply all pending migrations up to head
    Migrate,
    /// Open a shell inside the bot container
    Shell,
    /// Run the test suite inside the bot container
    Test {
        /// Extra arguments for the test runner, after `--`
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Remove services and volumes, then prune unused resources
    Clean,
    /// Show available commands
    Help,
    /// View, validate or create botctl.toml
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default botctl.toml
    Init,
}

impl Commands {
    fn alias(&self) -> Option<(Alias, Invocation)> {
        let plain = |alias| Some((alias, Invocation::default()));
        match self {
            Commands::Build => plain(Alias::Build),
            Commands::Up => plain(Alias::Up),
            Commands::Down => plain(Alias::Down),
            Commands::Restart => plain(Alias::Restart),
            Commands::Logs { extra } => Some((
                Alias::Logs,
                Invocation {
                    extra_args: extra.clone(),
                    ..Default::default()
                },
            )),
            Commands::Migration { label, name } => Some((
                Alias::Migration,
                Invocation {
                    migration_name: name
                        .clone()
                        .or_else(|| label.as_deref().map(parse_migration_name)),
                    ..Default::default()
                },
            )),
            Commands::Migrate => plain(Alias::Migrate),
            Commands::Shell => plain(Alias::Shell),
            Commands::Test { extra } => Some((
                Alias::Test,
                Invocation {
                    extra_args: extra.clone(),
                    ..Default::default()
                },
            )),
            Commands::Clean => plain(Alias::Clean),
            Commands::Help => plain(Alias::Help),
            Commands::Config { .. } => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = botctl::logging::init(cli.verbose) {
        eprintln!("{} {:#}", style("warning:").yellow().bold(), err);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let overrides = CliOverrides {
        service: cli.service.clone(),
        compose_files: cli.compose_files.clone(),
    };

    let Some((alias, invocation)) = cli.command.alias() else {
        if let Commands::Config { command } = &cli.command {
            cmd::cmd_config(&project_dir, &overrides, command.clone())?;
        }
        return Ok(ExitCode::SUCCESS);
    };

    if alias == Alias::Help {
        cmd::cmd_help();
        return Ok(ExitCode::SUCCESS);
    }

    cmd::cmd_alias(&project_dir, &overrides, alias, &invocation, cli.dry_run)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TaskError>()
        .map(TaskError::exit_code)
        .unwrap_or(1)
}
