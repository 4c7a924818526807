//! Process-wide default registry.
//!
//! Free functions for callers that do not want to pass a registry around.
//! The payload is a [`serde_json::Value`]. Code that owns its own
//! [`EventRegistry`] should use it directly instead.

use std::sync::OnceLock;

use crate::config::RegistryConfig;
use crate::error::EventResult;
use crate::handler::EventHandler;
use crate::record::{BoxError, Filter, ListenerId};
use crate::registry::{EventRegistry, ListenerSpec};

/// Payload type of the default registry.
pub type Args = serde_json::Value;

static DEFAULT: OnceLock<EventRegistry<Args>> = OnceLock::new();

/// Configure the default registry before its first use.
///
/// Returns `false` if the registry already exists, in which case its
/// configuration is left unchanged.
pub fn init(config: RegistryConfig) -> bool {
    DEFAULT.set(EventRegistry::with_config(config)).is_ok()
}

/// The default registry, created with the default configuration on first
/// use unless [`init`] ran earlier.
pub fn registry() -> &'static EventRegistry<Args> {
    DEFAULT.get_or_init(EventRegistry::new)
}

/// A handle over the default registry.
#[must_use]
pub fn handler() -> EventHandler<'static, Args> {
    EventHandler::new(registry())
}

/// Register a listener on the default registry.
///
/// # Errors
///
/// See [`EventRegistry::on`].
pub fn listen<F>(
    event_name: impl Into<String>,
    callback: F,
    filter: Option<Filter<Args>>,
    once: bool,
) -> EventResult<ListenerId>
where
    F: Fn(&Args) -> Result<(), BoxError> + Send + Sync + 'static,
{
    registry().on(event_name, callback, filter, once)
}

/// Register a once-only listener on the default registry.
///
/// # Errors
///
/// See [`EventRegistry::listen_once`].
pub fn listen_once<F>(
    event_name: impl Into<String>,
    callback: F,
    filter: Option<Filter<Args>>,
) -> EventResult<ListenerId>
where
    F: Fn(&Args) -> Result<(), BoxError> + Send + Sync + 'static,
{
    registry().listen_once(event_name, callback, filter)
}

/// Register several listeners on the default registry.
///
/// # Errors
///
/// See [`EventRegistry::listen_multi`]. Earlier registrations are kept.
pub fn listen_multi(
    specs: impl IntoIterator<Item = ListenerSpec<Args>>,
) -> EventResult<Vec<ListenerId>> {
    registry().listen_multi(specs)
}

/// Cancel listeners on the default registry.
///
/// # Errors
///
/// See [`EventRegistry::off`].
pub fn cancel(event_name: &str, id: Option<ListenerId>, once: bool) -> EventResult<bool> {
    registry().off(event_name, id, once)
}

/// Dispatch an event on the default registry.
///
/// # Errors
///
/// See [`EventRegistry::call`].
pub fn trigger(event_name: &str, id: Option<ListenerId>, args: &Args) -> EventResult<bool> {
    registry().call(event_name, id, args)
}
