//! Logging configuration for sqlward.
//!
//! Writes structured logs to stderr so that query results on stdout stay
//! machine-readable (the `ask` and `eval` commands print JSON there).

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr.
///
/// The filter is taken from `RUST_LOG` when set, defaulting to `info`.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path for the evaluation results directory.
///
/// Uses the XDG state directory on Linux (`~/.local/state/sqlward`),
/// falling back to the config directory, then the temp directory.
pub fn eval_output_dir() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("sqlward");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sqlward");
    }

    std::env::temp_dir().join("sqlward")
}
