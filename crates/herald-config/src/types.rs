//! Configuration types.
//!
//! These types do not depend on other herald crates. Values that map to
//! enums elsewhere (policies, log formats) are kept as strings here, checked
//! by [`validate`](crate::validate), and converted at the boundary. Every
//! struct implements [`Default`] so a bare `[section]` header in TOML
//! produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener registry behaviour.
    pub registry: RegistrySection,
    /// Logging level, format and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// RegistrySection
// ---------------------------------------------------------------------------

/// Listener registry behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// `"tolerant"` or `"strict"` handling of `cancel_all` on an event
    /// missing from one of the mappings.
    pub cancel_all: String,
    /// `"continue"` or `"abort"` after a listener fails during dispatch.
    pub on_failure: String,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            cancel_all: "tolerant".to_owned(),
            on_failure: "continue".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["herald_events=trace"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
