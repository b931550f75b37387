use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber writing compact logs to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` in verbose mode
/// and `warn` when only `RUST_LOG` asked for logging.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let default = if verbose { "debug" } else { "warn" };
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Logging is opt-in: `--verbose` or an explicit `RUST_LOG`.
pub fn enabled(verbose: bool) -> bool {
    verbose || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, warn};

    #[test]
    fn test_logging_init() {
        // We can only init once per process
        let _ = init(true);

        debug!("This is a debug message");
        warn!("This is a warning message");
    }

    #[test]
    fn test_verbose_enables_logging() {
        assert!(enabled(true));
    }
}
