//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_events::prelude::*;` to import all essential types.

// Registry
pub use crate::{EventHandler, EventRegistry, ListenerSpec};

// Listeners
pub use crate::{BoxError, ListenerId, ListenerKind, ListenerRecord};

// Configuration
pub use crate::{CancelAllPolicy, FailurePolicy, RegistryConfig};

// Errors
pub use crate::{EventError, EventResult};
