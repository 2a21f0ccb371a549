//! `tracing-subscriber` setup

use postline_domain::PostlineError;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber
///
/// Levels come from `RUST_LOG` (default [`DEFAULT_FILTER`]).
///
/// # Errors
/// Returns `PostlineError::Internal` if a global subscriber is already set.
pub fn init_logging(format: LogFormat) -> Result<(), PostlineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|err| PostlineError::Internal(format!("failed to install logger: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        // Another test in this binary may have won the race; at most one
        // install succeeds.
        let first = init_logging(LogFormat::Pretty);
        let second = init_logging(LogFormat::Json);

        assert!(first.is_err() || second.is_err());
        assert!(matches!(second, Err(PostlineError::Internal(_))));
    }
}
