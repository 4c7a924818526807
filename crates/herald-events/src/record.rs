//! Listener records and identifiers.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Error type returned by listener callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Callback invoked when a listener is dispatched.
pub type Callback<A> = Box<dyn Fn(&A) -> Result<(), BoxError> + Send + Sync>;

/// Filter predicate for a listener.
///
/// Returning `true` suppresses the listener for that payload.
pub type Filter<A> = Box<dyn Fn(&A) -> bool + Send + Sync>;

/// Registration handle for a listener.
///
/// Ids are assigned from 1 upwards and never reused by the registry that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(NonZeroU64);

impl ListenerId {
    /// Build an id from its raw value.
    ///
    /// Returns `None` for `0`, which never identifies a listener.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which mapping a listener lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    /// Stays registered until cancelled.
    Persistent,
    /// Removed after its first dispatch.
    Once,
}

impl ListenerKind {
    /// Kind for an `once` flag.
    #[must_use]
    pub fn from_once(once: bool) -> Self {
        if once { Self::Once } else { Self::Persistent }
    }

    /// Short lowercase name, used in logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Once => "once",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered listener: id, event name, callback and optional filter.
///
/// Records are immutable once built. The registry shares them behind an
/// `Arc` so a dispatch pass can run over a snapshot without holding a lock.
pub struct ListenerRecord<A> {
    id: ListenerId,
    event_name: String,
    callback: Callback<A>,
    filter: Option<Filter<A>>,
}

impl<A> fmt::Debug for ListenerRecord<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("event_name", &self.event_name)
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

impl<A> ListenerRecord<A> {
    /// Create a new record.
    pub fn new(
        id: ListenerId,
        event_name: impl Into<String>,
        callback: Callback<A>,
        filter: Option<Filter<A>>,
    ) -> Self {
        Self {
            id,
            event_name: event_name.into(),
            callback,
            filter,
        }
    }

    /// The listener's id.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The event name this listener is bound to.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Whether a filter predicate is attached.
    #[must_use]
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Run the listener for `args`.
    ///
    /// Returns `Ok(false)` when the filter suppressed the call and `Ok(true)`
    /// when the callback ran.
    ///
    /// # Errors
    ///
    /// Returns the callback's error unchanged.
    pub fn execute(&self, args: &A) -> Result<bool, BoxError> {
        if self.filter.as_ref().is_some_and(|filter| filter(args)) {
            return Ok(false);
        }
        (self.callback)(args)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(raw: u64) -> ListenerId {
        ListenerId::new(raw).unwrap()
    }

    fn counting(counter: &Arc<AtomicUsize>) -> Callback<i32> {
        let counter = Arc::clone(counter);
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_listener_id_zero_is_not_an_id() {
        assert!(ListenerId::new(0).is_none());
        assert_eq!(id(7).get(), 7);
        assert_eq!(id(7).to_string(), "7");
    }

    #[test]
    fn test_listener_id_serializes_as_integer() {
        let json = serde_json::to_string(&id(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: ListenerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id(42));
        assert!(serde_json::from_str::<ListenerId>("0").is_err());
    }

    #[test]
    fn test_execute_without_filter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let record = ListenerRecord::new(id(1), "tick", counting(&counter), None);

        assert!(record.execute(&5).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(record.event_name(), "tick");
        assert!(!record.has_filter());
    }

    #[test]
    fn test_filter_true_suppresses_callback() {
        let counter = Arc::new(AtomicUsize::new(0));
        let record = ListenerRecord::new(
            id(1),
            "tick",
            counting(&counter),
            Some(Box::new(|n: &i32| *n < 0)),
        );

        assert!(!record.execute(&-1).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert!(record.execute(&1).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_error_is_returned() {
        let record: ListenerRecord<i32> =
            ListenerRecord::new(id(3), "tick", Box::new(|_| Err("boom".into())), None);

        let err = record.execute(&0).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_kind_from_once() {
        assert_eq!(ListenerKind::from_once(true), ListenerKind::Once);
        assert_eq!(ListenerKind::from_once(false), ListenerKind::Persistent);
        assert_eq!(ListenerKind::Once.to_string(), "once");
    }
}
