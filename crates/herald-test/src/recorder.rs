//! Recorders for observing listener invocations.

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Error type returned by listener callbacks.
pub type CallbackError = Box<dyn Error + Send + Sync>;

/// Ordered, shareable log of calls.
///
/// Clones share the same log, so one clone can be moved into a callback
/// while the test keeps another to inspect.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(entry.into());
        }
    }

    /// Snapshot of every entry, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().map(|g| g.len()).unwrap_or_default()
    }

    /// Whether nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.clear();
        }
    }
}

/// Shareable invocation counter.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call.
    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// A callback that bumps `counter` on every call and succeeds.
pub fn counting_callback<A>(
    counter: CallCounter,
) -> impl Fn(&A) -> Result<(), CallbackError> + Send + Sync {
    move |_| {
        counter.hit();
        Ok(())
    }
}

/// A callback that logs `label` and then fails with `message`.
pub fn failing_callback<A>(
    log: CallLog,
    label: &'static str,
    message: &'static str,
) -> impl Fn(&A) -> Result<(), CallbackError> + Send + Sync {
    move |_| {
        log.push(label);
        Err(message.into())
    }
}
