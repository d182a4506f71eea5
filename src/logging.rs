//! Diagnostic logging to stderr.
//!
//! Command output belongs to the external tools, so botctl itself stays quiet
//! unless asked: `warn` by default, `debug` with `--verbose`, and `RUST_LOG`
//! takes precedence over both.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "botctl=debug" } else { "botctl=warn" }
}

pub fn init(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to initialize logging: {}", err))
}
