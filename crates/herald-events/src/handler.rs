//! Borrowed handle over a registry.

use std::fmt;

use crate::error::EventResult;
use crate::record::{BoxError, Filter, ListenerId};
use crate::registry::EventRegistry;

/// A component-facing handle bound to one [`EventRegistry`].
///
/// Components that only register, deregister and raise events can hold a
/// handle instead of the registry's full API.
pub struct EventHandler<'r, A> {
    registry: &'r EventRegistry<A>,
}

impl<A> Clone for EventHandler<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for EventHandler<'_, A> {}

impl<A> fmt::Debug for EventHandler<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("registry", self.registry)
            .finish()
    }
}

impl<'r, A> EventHandler<'r, A> {
    /// Bind a handle to `registry`.
    #[must_use]
    pub fn new(registry: &'r EventRegistry<A>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &'r EventRegistry<A> {
        self.registry
    }

    /// Register a listener.
    ///
    /// # Errors
    ///
    /// Propagates registration errors from [`EventRegistry::on`].
    pub fn register<F>(
        &self,
        event_name: impl Into<String>,
        callback: F,
        filter: Option<Filter<A>>,
        once: bool,
    ) -> EventResult<ListenerId>
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.registry.on(event_name, callback, filter, once)
    }

    /// Deregister one listener, or every listener of the event when `id` is
    /// `None`.
    ///
    /// An id is looked up in both mappings. Returns whether anything was
    /// removed.
    pub fn deregister(&self, event_name: &str, id: Option<ListenerId>) -> bool {
        match id {
            Some(id) => self.registry.remove(event_name, id),
            None => self.registry.remove_all(event_name),
        }
    }

    /// Raise `event_name` for every listener.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors from [`EventRegistry::call`].
    pub fn on_event(&self, event_name: &str, args: &A) -> EventResult<bool> {
        self.registry.call(event_name, None, args)
    }

    /// Raise `event_name` for the listener with `id` only.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors from [`EventRegistry::call`].
    pub fn on_targeted_event(
        &self,
        event_name: &str,
        id: ListenerId,
        args: &A,
    ) -> EventResult<bool> {
        self.registry.call(event_name, Some(id), args)
    }
}
