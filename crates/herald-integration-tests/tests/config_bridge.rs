//! Configuration files driving registry and logging behaviour.

use herald_config::{Config, ConfigError};
use herald_events::prelude::*;
use herald_telemetry::{LogConfig, LogFormat};
use herald_test::{CallLog, test_file_with_extension};

#[test]
fn test_strict_config_from_file() {
    let file = test_file_with_extension(
        "[registry]\ncancel_all = \"strict\"\non_failure = \"abort\"\n",
        "toml",
    );
    let config = Config::load_file(file.path()).unwrap();
    let registry = EventRegistry::<u8>::with_config(RegistryConfig::from(&config.registry));

    assert_eq!(registry.config().cancel_all, CancelAllPolicy::Strict);
    assert_eq!(registry.config().on_failure, FailurePolicy::Abort);

    registry.listen("save", |_| Ok(()), None).unwrap();
    let err = registry.cancel_all("save").unwrap_err();
    assert!(matches!(err, EventError::MissingMapping { .. }));

    // `remove_all` ignores the strict policy.
    assert!(registry.remove_all("save"));
}

#[test]
fn test_abort_policy_from_config() {
    let config = Config::from_toml_str("[registry]\non_failure = \"abort\"").unwrap();
    let registry = EventRegistry::<u8>::with_config(RegistryConfig::from(&config.registry));
    let log = CallLog::new();

    registry.listen("save", |_| Err("disk full".into()), None).unwrap();
    let sink = log.clone();
    registry
        .listen(
            "save",
            move |_| {
                sink.push("after");
                Ok(())
            },
            None,
        )
        .unwrap();

    assert!(registry.call("save", None, &0).is_err());
    assert!(log.is_empty());
}

#[test]
fn test_defaults_are_tolerant() {
    let config = Config::default();
    let registry = EventRegistry::<u8>::with_config(RegistryConfig::from(&config.registry));
    assert_eq!(registry.config(), RegistryConfig::default());
    assert!(!registry.cancel_all("never-registered").unwrap());
}

#[test]
fn test_logging_section_to_log_config() {
    let config = Config::from_toml_str(
        "[logging]\nlevel = \"debug\"\nformat = \"json\"\ndirectives = [\"herald_events=trace\"]",
    )
    .unwrap();
    let log_config = LogConfig::from(&config.logging);

    assert_eq!(log_config.level, "debug");
    assert_eq!(log_config.format, LogFormat::Json);
    assert_eq!(log_config.directives, vec!["herald_events=trace"]);
}

#[test]
fn test_invalid_policy_rejected() {
    let err = Config::from_toml_str("[registry]\ncancel_all = \"sometimes\"").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}
