//! Configuration for botctl, read from `botctl.toml` in the project directory.
//!
//! Settings are layered: file → environment (including `.env`) → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [compose]
//! command = ["docker", "compose"]
//! service = "bot"
//! files = ["docker-compose.yml", "docker-compose.dev.yml"]
//!
//! [migrations]
//! tool = "alembic"
//! in_container = true
//!
//! [tasks]
//! shell = "/bin/bash"
//! test = ["pytest"]
//! prune = ["docker", "system", "prune", "-f"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::TaskError;
use crate::runner::CommandLine;

/// File name looked up in the project directory.
pub const CONFIG_FILE: &str = "botctl.toml";

pub const ENV_COMPOSE: &str = "BOTCTL_COMPOSE";
pub const ENV_SERVICE: &str = "BOTCTL_SERVICE";
pub const ENV_MIGRATION_TOOL: &str = "BOTCTL_MIGRATION_TOOL";

/// How the container orchestrator is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeSection {
    /// Orchestrator command, program first
    #[serde(default = "default_compose_command")]
    pub command: Vec<String>,
    /// Service that `logs`, `shell`, `test` and the migration aliases target
    #[serde(default = "default_service")]
    pub service: String,
    /// Compose files passed as `-f <file>`; empty means the orchestrator's own default
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

fn default_compose_command() -> Vec<String> {
    vec!["docker".to_string(), "compose".to_string()]
}

fn default_service() -> String {
    "bot".to_string()
}

impl Default for ComposeSection {
    fn default() -> Self {
        Self {
            command: default_compose_command(),
            service: default_service(),
            files: Vec::new(),
        }
    }
}

/// How the migration tool is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationsSection {
    #[serde(default = "default_migration_tool")]
    pub tool: String,
    /// Run the tool through `compose exec <service>` rather than on the host
    #[serde(default = "default_in_container")]
    pub in_container: bool,
}

fn default_migration_tool() -> String {
    "alembic".to_string()
}

fn default_in_container() -> bool {
    true
}

impl Default for MigrationsSection {
    fn default() -> Self {
        Self {
            tool: default_migration_tool(),
            in_container: default_in_container(),
        }
    }
}

/// Programs used by the `shell`, `test` and `clean` aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksSection {
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Test command run inside the service container
    #[serde(default = "default_test")]
    pub test: Vec<String>,
    /// Host command run after `compose down -v` by `clean`
    #[serde(default = "default_prune")]
    pub prune: Vec<String>,
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

fn default_test() -> Vec<String> {
    vec!["pytest".to_string()]
}

fn default_prune() -> Vec<String> {
    ["docker", "system", "prune", "-f"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            test: default_test(),
            prune: default_prune(),
        }
    }
}

/// Root of `botctl.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotctlToml {
    #[serde(default)]
    pub compose: ComposeSection,
    #[serde(default)]
    pub migrations: MigrationsSection,
    #[serde(default)]
    pub tasks: TasksSection,
}

impl BotctlToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse botctl.toml")
    }

    /// Load `botctl.toml` from the project directory, or defaults if it doesn't exist.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize botctl.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `BOTCTL_*` overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(compose) = lookup(ENV_COMPOSE) {
            self.compose.command = compose.split_whitespace().map(str::to_string).collect();
        }
        if let Some(service) = lookup(ENV_SERVICE) {
            self.compose.service = service;
        }
        if let Some(tool) = lookup(ENV_MIGRATION_TOOL) {
            self.migrations.tool = tool;
        }
    }

    /// Apply command-line overrides, which win over file and environment.
    pub fn apply_cli(&mut self, overrides: &CliOverrides) {
        if let Some(service) = &overrides.service {
            self.compose.service = service.clone();
        }
        if !overrides.compose_files.is_empty() {
            self.compose.files = overrides.compose_files.clone();
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.compose.command.is_empty() {
            warnings.push("compose.command is empty".to_string());
        }
        if self.compose.service.trim().is_empty() {
            warnings.push("compose.service is empty".to_string());
        }
        if self.migrations.tool.trim().is_empty() {
            warnings.push("migrations.tool is empty".to_string());
        }
        if self.tasks.shell.trim().is_empty() {
            warnings.push("tasks.shell is empty".to_string());
        }
        if self.tasks.test.is_empty() {
            warnings.push("tasks.test is empty".to_string());
        }
        if self.tasks.prune.is_empty() {
            warnings.push("tasks.prune is empty".to_string());
        }

        warnings
    }
}

/// Overrides taken from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub service: Option<String>,
    pub compose_files: Vec<PathBuf>,
}

/// Effective settings: `botctl.toml` merged with environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub toml: BotctlToml,
}

impl Settings {
    /// Resolve settings for a project directory.
    ///
    /// Loads `<project_dir>/.env` first so it can carry `BOTCTL_*` overrides;
    /// variables already present in the environment are left alone.
    pub fn load(project_dir: &Path, overrides: &CliOverrides) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve project directory: {}", project_dir.display()))?;

        load_dotenv(&project_dir)?;

        let mut toml = BotctlToml::load_or_default(&project_dir)?;
        toml.apply_env(|key| std::env::var(key).ok());
        toml.apply_cli(overrides);

        Ok(Self { project_dir, toml })
    }

    pub fn from_toml(project_dir: impl Into<PathBuf>, toml: BotctlToml) -> Self {
        Self {
            project_dir: project_dir.into(),
            toml,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE)
    }

    pub fn service(&self) -> &str {
        &self.toml.compose.service
    }

    /// The orchestrator invocation every compose alias starts from,
    /// including any `-f <file>` arguments.
    pub fn compose(&self) -> Result<CommandLine, TaskError> {
        let mut line = CommandLine::from_parts(&self.toml.compose.command)
            .ok_or(TaskError::EmptyCommand { what: "compose" })?;
        for file in &self.toml.compose.files {
            line = line.arg("-f").arg(file.display().to_string());
        }
        Ok(line)
    }

    /// `compose exec <service>` followed by `command`.
    pub fn exec_in_service<I, S>(&self, command: I) -> Result<CommandLine, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self
            .compose()?
            .arg("exec")
            .arg(self.service())
            .args(command))
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

fn load_dotenv(project_dir: &Path) -> Result<()> {
    let env_path = project_dir.join(".env");
    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            tracing::debug!(path = %env_path.display(), "loaded environment file");
            Ok(())
        }
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", env_path.display())),
    }
}
