//! Registry behaviour switches.

use serde::{Deserialize, Serialize};

/// How `cancel_all` treats an event missing from one of the mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelAllPolicy {
    /// Remove whatever exists; report whether anything was removed.
    #[default]
    Tolerant,
    /// Fail with `MissingMapping` unless both mappings hold the event.
    Strict,
}

/// What a dispatch pass does after a callback returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep dispatching the remaining listeners and report all failures.
    #[default]
    Continue,
    /// Stop the pass at the first failure.
    Abort,
}

/// Registry configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// `cancel_all` behaviour.
    pub cancel_all: CancelAllPolicy,
    /// Callback failure behaviour.
    pub on_failure: FailurePolicy,
}

impl RegistryConfig {
    /// Set the `cancel_all` policy.
    #[must_use]
    pub fn with_cancel_all(mut self, policy: CancelAllPolicy) -> Self {
        self.cancel_all = policy;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

#[cfg(feature = "config")]
impl From<&herald_config::RegistrySection> for RegistryConfig {
    fn from(section: &herald_config::RegistrySection) -> Self {
        let cancel_all = match section.cancel_all.as_str() {
            "strict" => CancelAllPolicy::Strict,
            _ => CancelAllPolicy::Tolerant,
        };
        let on_failure = match section.on_failure.as_str() {
            "abort" => FailurePolicy::Abort,
            _ => FailurePolicy::Continue,
        };
        Self {
            cancel_all,
            on_failure,
        }
    }
}
