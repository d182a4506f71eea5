//! The alias table: each name maps to a fixed external command invocation.
//!
//! | Alias       | Expansion (defaults)                                           |
//! |-------------|----------------------------------------------------------------|
//! | `build`     | `docker compose build`                                         |
//! | `up`        | `docker compose up -d`                                         |
//! | `down`      | `docker compose down`                                          |
//! | `restart`   | `docker compose restart`                                       |
//! | `logs`      | `docker compose logs -f bot`                                   |
//! | `migration` | `docker compose exec bot alembic revision --autogenerate -m <name>` |
//! | `migrate`   | `docker compose exec bot alembic upgrade head`                 |
//! | `shell`     | `docker compose exec bot /bin/bash`                            |
//! | `test`      | `docker compose exec bot pytest`                               |
//! | `clean`     | `docker compose down -v`, then `docker system prune -f`        |
//! | `help`      | prints this table                                              |

use console::style;
use std::fmt::Write as _;

use crate::config::Settings;
use crate::errors::TaskError;
use crate::runner::{CommandLine, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    Build,
    Up,
    Down,
    Restart,
    Logs,
    Migration,
    Migrate,
    Shell,
    Test,
    Clean,
    Help,
}

/// Per-call arguments an alias may consume.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Label for `migration`
    pub migration_name: Option<String>,
    /// Appended to the expansion of `logs` and `test`
    pub extra_args: Vec<String>,
}

impl Alias {
    /// Every alias, in help order.
    pub fn all() -> &'static [Alias] {
        &[
            Alias::Build,
            Alias::Up,
            Alias::Down,
            Alias::Restart,
            Alias::Logs,
            Alias::Migration,
            Alias::Migrate,
            Alias::Shell,
            Alias::Test,
            Alias::Clean,
            Alias::Help,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Alias::Build => "build",
            Alias::Up => "up",
            Alias::Down => "down",
            Alias::Restart => "restart",
            Alias::Logs => "logs",
            Alias::Migration => "migration",
            Alias::Migrate => "migrate",
            Alias::Shell => "shell",
            Alias::Test => "test",
            Alias::Clean => "clean",
            Alias::Help => "help",
        }
    }

    /// How the alias is written on the command line, arguments included.
    pub fn usage(self) -> &'static str {
        match self {
            Alias::Migration => "migration name=<text>",
            other => other.name(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Alias::Build => "Build containers for all services",
            Alias::Up => "Start all services in the background",
            Alias::Down => "Stop and remove all services",
            Alias::Restart => "Restart all services",
            Alias::Logs => "Follow logs of the bot service",
            Alias::Migration => "Autogenerate a new migration labeled <text>",
            Alias::Migrate => "Apply all pending migrations up to head",
            Alias::Shell => "Open a shell inside the bot container",
            Alias::Test => "Run the test suite inside the bot container",
            Alias::Clean => "Remove services and volumes, then prune unused resources",
            Alias::Help => "Show available commands",
        }
    }

    /// Expand this alias into the command lines to run.
    ///
    /// `help` expands to nothing; the caller prints [`render_help`] instead.
    pub fn plan(self, settings: &Settings, invocation: &Invocation) -> Result<Plan, TaskError> {
        let plan = match self {
            Alias::Build => vec![settings.compose()?.arg("build")],
            Alias::Up => vec![settings.compose()?.args(["up", "-d"])],
            Alias::Down => vec![settings.compose()?.arg("down")],
            Alias::Restart => vec![settings.compose()?.arg("restart")],
            Alias::Logs => vec![
                settings
                    .compose()?
                    .args(["logs", "-f"])
                    .arg(settings.service())
                    .args(invocation.extra_args.iter().cloned()),
            ],
            Alias::Migration => {
                let name = invocation
                    .migration_name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .ok_or(TaskError::MissingMigrationName)?;
                vec![migration_tool(
                    settings,
                    ["revision", "--autogenerate", "-m", name],
                )?]
            }
            Alias::Migrate => vec![migration_tool(settings, ["upgrade", "head"])?],
            Alias::Shell => vec![settings.exec_in_service([settings.toml.tasks.shell.as_str()])?],
            Alias::Test => {
                if settings.toml.tasks.test.is_empty() {
                    return Err(TaskError::EmptyCommand { what: "test" });
                }
                vec![
                    settings.exec_in_service(
                        settings
                            .toml
                            .tasks
                            .test
                            .iter()
                            .chain(&invocation.extra_args)
                            .cloned(),
                    )?,
                ]
            }
            Alias::Clean => {
                let prune = CommandLine::from_parts(&settings.toml.tasks.prune)
                    .ok_or(TaskError::EmptyCommand { what: "prune" })?;
                vec![settings.compose()?.args(["down", "-v"]), prune]
            }
            Alias::Help => Vec::new(),
        };
        Ok(plan)
    }
}

impl std::fmt::Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Alias {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Alias::all()
            .iter()
            .copied()
            .find(|alias| alias.name() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown command '{}'. Run 'botctl help'.", s))
    }
}

/// The migration tool with `args`, inside the service container unless
/// `migrations.in_container` is off.
fn migration_tool<const N: usize>(
    settings: &Settings,
    args: [&str; N],
) -> Result<CommandLine, TaskError> {
    let tool = settings.toml.migrations.tool.as_str();
    if tool.trim().is_empty() {
        return Err(TaskError::EmptyCommand { what: "migration" });
    }
    if settings.toml.migrations.in_container {
        Ok(settings.exec_in_service(std::iter::once(tool).chain(args))?)
    } else {
        Ok(CommandLine::new(tool).args(args))
    }
}

/// Accept `name=<text>` (make style) or a bare `<text>` for the migration label.
pub fn parse_migration_name(raw: &str) -> String {
    raw.strip_prefix("name=").unwrap_or(raw).to_string()
}

/// The `help` listing: every alias with its one-line description.
pub fn render_help() -> String {
    let width = Alias::all()
        .iter()
        .map(|alias| alias.usage().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{}", style("Available commands:").bold());
    for alias in Alias::all() {
        let _ = writeln!(
            out,
            "  {}  {}",
            style(format!("{:<width$}", alias.usage())).cyan(),
            alias.description()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Settings come from botctl.toml; see 'botctl config show'."
    );
    out
}
