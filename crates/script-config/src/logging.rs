//! Tracing setup for hosts embedding the configurator
//!
//! Log output of this workspace is filtered separately from the host's own
//! crates. `SCRIPT_CONFIG_LOG` takes precedence over `RUST_LOG`; without
//! either, only the script crates log at `info` and everything else at
//! `warn`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{Error, Result};

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "SCRIPT_CONFIG_LOG";

/// Filter used when no environment variable is set
pub const DEFAULT_DIRECTIVES: &str = "warn,script_api=info,script_config=info";

/// Directives from the environment, or [`DEFAULT_DIRECTIVES`]
pub fn directives_from_env() -> String {
    [LOG_ENV_VAR, EnvFilter::DEFAULT_ENV]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Parse filter directives such as `script_config=debug`
pub fn filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| Error::LoggingInit {
        reason: format!("invalid filter '{}': {}", directives, e),
    })
}

/// Install a global tracing subscriber
///
/// Fails if the directives are invalid or a subscriber is already
/// installed.
pub fn init() -> Result<()> {
    init_with(&directives_from_env())
}

/// Install a global tracing subscriber with explicit directives
pub fn init_with(directives: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter(directives)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::LoggingInit {
            reason: e.to_string(),
        })?;

    tracing::debug!(directives, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_script_crates() {
        let rendered = filter(DEFAULT_DIRECTIVES).unwrap().to_string();
        assert!(rendered.contains("script_config=info"), "{rendered}");
        assert!(rendered.contains("script_api=info"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }

    #[test]
    fn test_invalid_directives_are_rejected() {
        let err = filter("script_config=loud").unwrap_err();
        assert!(matches!(err, Error::LoggingInit { .. }));
        assert!(err.to_string().contains("script_config=loud"));
    }

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed the subscriber first
        let _ = init_with("script_config=debug");
        let err = init_with(DEFAULT_DIRECTIVES).unwrap_err();
        assert!(matches!(err, Error::LoggingInit { .. }));
    }
}
