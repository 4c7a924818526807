//! Registry error types.

use std::fmt;

use thiserror::Error;

use crate::record::{BoxError, ListenerId, ListenerKind};

/// A callback that returned an error during dispatch.
pub struct ListenerFailure {
    /// Id of the failing listener.
    pub id: ListenerId,
    /// Which mapping the listener was dispatched from.
    pub kind: ListenerKind,
    /// The error returned by the callback.
    pub source: BoxError,
}

impl fmt::Debug for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFailure")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("source", &self.source.to_string())
            .finish()
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener {} failed: {}", self.kind, self.id, self.source)
    }
}

/// Errors that can occur with registry operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// `cancel_all` under the strict policy found no sequence in one mapping.
    #[error("no {kind} listeners registered for event '{event}'")]
    MissingMapping {
        /// Event name passed to `cancel_all`.
        event: String,
        /// The mapping that had no entry.
        kind: ListenerKind,
    },

    /// The id counter cannot issue another id.
    #[error("listener id space exhausted")]
    IdSpaceExhausted,

    /// One or more listeners failed while an event was dispatched.
    #[error(
        "{} listener(s) failed while dispatching '{event}': {}",
        failures.len(),
        summarize(failures)
    )]
    Dispatch {
        /// Event name being dispatched.
        event: String,
        /// Every failure, in dispatch order.
        failures: Vec<ListenerFailure>,
    },
}

fn summarize(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl EventError {
    /// Failures carried by a `Dispatch` error, empty for other variants.
    #[must_use]
    pub fn failures(&self) -> &[ListenerFailure] {
        match self {
            Self::Dispatch { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type for registry operations.
pub type EventResult<T> = Result<T, EventError>;
