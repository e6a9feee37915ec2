use kdb_core::kernel::error::{Error as KernelError, Result as KernelResult};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`RUST_LOG` syntax)
pub const LOG_ENV: &str = "KDB_LOG";

/// Installs a global subscriber printing `log` records to stderr.
///
/// The filter comes from `KDB_LOG` and defaults to `warn`. Fails, without
/// panicking, if a logger is already installed.
pub fn init_logging() -> KernelResult<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| KernelError::Other(format!("Failed to initialize logging: {}", e)))?;
    log::debug!("Logging initialized");
    Ok(())
}
