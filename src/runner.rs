//! Execution of expanded aliases.
//!
//! A [`Plan`] is a list of [`CommandLine`]s run one after another. Each
//! command is spawned directly (never through a shell) with the caller's
//! terminal attached, and the first non-zero exit ends the plan.

use async_trait::async_trait;
use console::style;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::TaskError;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from `[program, args...]`. Returns `None` when `parts` is empty.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_word(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", display_word(arg))?;
        }
        Ok(())
    }
}

/// Quote a word for display so the echoed line can be pasted into `sh`.
fn display_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// The ordered command lines an alias expands to.
pub type Plan = Vec<CommandLine>;

/// How an external command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Code(i32),
    /// Terminated by a signal (Unix only)
    Signal(i32),
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome::Code(0);

    pub fn success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signal(signal);
            }
        }
        ExitOutcome::Code(1)
    }

    /// The exit code a shell would report for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            ExitOutcome::Code(code) => u8::try_from(code).unwrap_or(1),
            ExitOutcome::Signal(signal) => u8::try_from(128 + signal).unwrap_or(1),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Code(code) => write!(f, "exit code {}", code),
            ExitOutcome::Signal(signal) => write!(f, "signal {}", signal),
        }
    }
}

/// Runs a single command line.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, line: &CommandLine) -> Result<ExitOutcome, TaskError>;
}

/// Spawns real processes with inherited stdio.
pub struct ProcessExecutor {
    working_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn run(&self, line: &CommandLine) -> Result<ExitOutcome, TaskError> {
        eprintln!("{}", style(line).dim());
        info!(command = %line, dir = %self.working_dir.display(), "running");

        let mut child = Command::new(&line.program)
            .args(&line.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| TaskError::from_spawn(&line.program, source))?;

        // Ctrl-C reaches the child through the terminal's process group.
        // Keep waiting so its exit status is what gets reported.
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => debug!(program = %line.program, "interrupt received, waiting for child"),
                    Err(err) => {
                        warn!(error = %err, "cannot listen for interrupts");
                        break child.wait().await;
                    }
                },
            }
        }
        .map_err(|source| TaskError::Wait {
            program: line.program.clone(),
            source,
        })?;

        let outcome = ExitOutcome::from_status(status);
        debug!(command = %line, %outcome, "finished");
        Ok(outcome)
    }
}

/// Prints command lines to stdout instead of running them.
pub struct DryRunExecutor;

#[async_trait]
impl Executor for DryRunExecutor {
    async fn run(&self, line: &CommandLine) -> Result<ExitOutcome, TaskError> {
        println!("{}", line);
        Ok(ExitOutcome::SUCCESS)
    }
}

/// Run every step of `plan` in order, stopping at the first failure.
pub async fn run_plan(executor: &dyn Executor, plan: &[CommandLine]) -> Result<ExitOutcome, TaskError> {
    for (index, line) in plan.iter().enumerate() {
        let outcome = executor.run(line).await?;
        if !outcome.success() {
            let skipped = plan.len() - index - 1;
            warn!(command = %line, %outcome, skipped, "command failed");
            return Ok(outcome);
        }
    }
    Ok(ExitOutcome::SUCCESS)
}
