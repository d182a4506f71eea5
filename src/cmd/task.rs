//! Alias execution — `botctl build`, `botctl up`, ... and `botctl help`.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use botctl::alias::{Alias, Invocation, render_help};
use botctl::config::{CliOverrides, Settings};
use botctl::runner::{DryRunExecutor, Executor, ProcessExecutor, run_plan};

pub fn cmd_alias(
    project_dir: &Path,
    overrides: &CliOverrides,
    alias: Alias,
    invocation: &Invocation,
    dry_run: bool,
) -> Result<ExitCode> {
    let settings = Settings::load(project_dir, overrides)?;
    for warning in settings.validate() {
        tracing::warn!("{}", warning);
    }

    let plan = alias.plan(&settings, invocation)?;
    tracing::debug!(%alias, steps = plan.len(), dry_run, "expanded alias");

    let executor: Box<dyn Executor> = if dry_run {
        Box::new(DryRunExecutor)
    } else {
        Box::new(ProcessExecutor::new(&settings.project_dir))
    };

    // Single-threaded: one external command runs at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let outcome = runtime.block_on(run_plan(executor.as_ref(), &plan))?;

    Ok(ExitCode::from(outcome.exit_code()))
}

pub fn cmd_help() {
    print!("{}", render_help());
}
