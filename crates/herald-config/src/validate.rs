//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_registry(config)?;
    validate_logging(config)?;
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str], what: &str) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        field: field.to_owned(),
        message: format!(
            "unsupported {what} '{value}'; expected one of: {}",
            allowed.join(", ")
        ),
    })
}

fn validate_registry(config: &Config) -> ConfigResult<()> {
    let r = &config.registry;
    one_of(
        "registry.cancel_all",
        &r.cancel_all,
        &["tolerant", "strict"],
        "cancel_all policy",
    )?;
    one_of(
        "registry.on_failure",
        &r.on_failure,
        &["continue", "abort"],
        "failure policy",
    )
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    one_of(
        "logging.level",
        &l.level,
        &["trace", "debug", "info", "warn", "error"],
        "log level",
    )?;
    one_of(
        "logging.format",
        &l.format,
        &["pretty", "compact", "json", "full"],
        "log format",
    )?;

    if let Some(empty) = l.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: format!("logging.directives[{empty}]"),
            message: "directive must not be empty".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_cancel_all_policy() {
        let mut config = Config::default();
        config.registry.cancel_all = "lenient".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "registry.cancel_all"
        ));
    }

    #[test]
    fn test_invalid_failure_policy() {
        let mut config = Config::default();
        config.registry.on_failure = "retry".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_directive() {
        let mut config = Config::default();
        config.logging.directives = vec!["herald_events=debug".to_owned(), " ".to_owned()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("logging.directives[1]"));
    }
}
