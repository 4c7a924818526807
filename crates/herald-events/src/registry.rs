//! Listener registry and dispatch.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace, warn};

use crate::config::{CancelAllPolicy, FailurePolicy, RegistryConfig};
use crate::error::{EventError, EventResult, ListenerFailure};
use crate::record::{BoxError, Callback, Filter, ListenerId, ListenerKind, ListenerRecord};

type Sequence<A> = VecDeque<Arc<ListenerRecord<A>>>;

/// Registration request used by [`EventRegistry::listen_multi`].
pub struct ListenerSpec<A> {
    event_name: String,
    callback: Callback<A>,
    filter: Option<Filter<A>>,
    once: bool,
}

impl<A> ListenerSpec<A> {
    /// Persistent listener for `event_name`.
    pub fn new<F>(event_name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            event_name: event_name.into(),
            callback: Box::new(callback),
            filter: None,
            once: false,
        }
    }

    /// Attach a filter. A `true` result suppresses the listener.
    #[must_use]
    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Register as a once-only listener.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

impl<A> fmt::Debug for ListenerSpec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSpec")
            .field("event_name", &self.event_name)
            .field("has_filter", &self.filter.is_some())
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// One mapping from event name to its ordered records.
struct Mapping<A> {
    sequences: HashMap<String, Sequence<A>>,
    /// Names whose entry was created. An entry outlives its last record
    /// until the whole entry is dropped, which is what strict `cancel_all`
    /// checks.
    entries: HashSet<String>,
}

impl<A> Mapping<A> {
    fn new() -> Self {
        Self {
            sequences: HashMap::new(),
            entries: HashSet::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&Sequence<A>> {
        self.sequences.get(name)
    }

    fn push(&mut self, record: Arc<ListenerRecord<A>>) {
        let name = record.event_name();
        if !self.entries.contains(name) {
            self.entries.insert(name.to_owned());
        }
        self.sequences
            .entry(name.to_owned())
            .or_default()
            .push_back(record);
    }

    /// Remove the first record matching `id`.
    ///
    /// Returns `(sequence_existed, record_removed)`. A sequence left empty is
    /// dropped, its entry is kept.
    fn remove_first(&mut self, name: &str, id: ListenerId) -> (bool, bool) {
        let Some(seq) = self.sequences.get_mut(name) else {
            return (false, false);
        };
        let removed = match seq.iter().position(|r| r.id() == id) {
            Some(pos) => seq.remove(pos).is_some(),
            None => false,
        };
        if seq.is_empty() {
            self.sequences.remove(name);
        }
        (true, removed)
    }

    /// Drop the entry for `name` and return its records, if any.
    fn drop_entry(&mut self, name: &str) -> Option<Sequence<A>> {
        self.entries.remove(name);
        self.sequences.remove(name)
    }

    /// Forget the entry for `name` if no record is left under it.
    fn forget_if_drained(&mut self, name: &str) {
        if !self.sequences.contains_key(name) {
            self.entries.remove(name);
        }
    }

    fn clear(&mut self) {
        self.sequences.clear();
        self.entries.clear();
    }
}

/// Both mappings plus the id counter, guarded together.
struct Listeners<A> {
    persistent: Mapping<A>,
    once_only: Mapping<A>,
    /// Ids of every registered record, across both mappings.
    live: HashSet<ListenerId>,
    /// `None` once every `u64` id has been issued.
    next_id: Option<ListenerId>,
}

impl<A> Listeners<A> {
    fn new() -> Self {
        Self {
            persistent: Mapping::new(),
            once_only: Mapping::new(),
            live: HashSet::new(),
            next_id: ListenerId::new(1),
        }
    }

    fn map(&self, kind: ListenerKind) -> &Mapping<A> {
        match kind {
            ListenerKind::Persistent => &self.persistent,
            ListenerKind::Once => &self.once_only,
        }
    }

    fn map_mut(&mut self, kind: ListenerKind) -> &mut Mapping<A> {
        match kind {
            ListenerKind::Persistent => &mut self.persistent,
            ListenerKind::Once => &mut self.once_only,
        }
    }

    fn allocate_id(&mut self) -> EventResult<ListenerId> {
        let id = self.next_id.ok_or(EventError::IdSpaceExhausted)?;
        self.next_id = id.get().checked_add(1).and_then(ListenerId::new);
        Ok(id)
    }

    fn insert(&mut self, kind: ListenerKind, record: Arc<ListenerRecord<A>>) {
        self.live.insert(record.id());
        self.map_mut(kind).push(record);
    }

    fn remove_first(&mut self, kind: ListenerKind, name: &str, id: ListenerId) -> (bool, bool) {
        let (existed, removed) = self.map_mut(kind).remove_first(name, id);
        if removed {
            self.live.remove(&id);
        }
        (existed, removed)
    }

    /// Drop both entries for `name`. Returns whether any record went with
    /// them.
    fn remove_event(&mut self, name: &str) -> bool {
        let persistent = self.persistent.drop_entry(name);
        let once = self.once_only.drop_entry(name);
        let mut removed = false;
        for record in persistent.into_iter().chain(once).flatten() {
            self.live.remove(&record.id());
            removed = true;
        }
        removed
    }

    fn is_live(&self, id: ListenerId) -> bool {
        self.live.contains(&id)
    }

    fn clear(&mut self) {
        self.persistent.clear();
        self.once_only.clear();
        self.live.clear();
    }
}

/// Outcome of one dispatch pass over a single mapping.
struct Pass {
    matched: bool,
    failures: Vec<ListenerFailure>,
}

impl Pass {
    fn missed() -> Self {
        Self {
            matched: false,
            failures: Vec::new(),
        }
    }
}

/// Registry of named-event listeners.
///
/// Persistent and once-only listeners are kept in separate mappings, each
/// keyed by event name to an ordered sequence of records. Ids come from a
/// single counter shared by both mappings.
///
/// All operations take `&self`. The internal lock is never held while a
/// filter or callback runs, so listeners may call back into the registry
/// (register, cancel, dispatch) without deadlocking.
pub struct EventRegistry<A> {
    listeners: RwLock<Listeners<A>>,
    config: RegistryConfig,
}

impl<A> fmt::Debug for EventRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        f.debug_struct("EventRegistry")
            .field("persistent_events", &guard.persistent.sequences.len())
            .field("once_events", &guard.once_only.sequences.len())
            .field("listeners", &guard.live.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<A> Default for EventRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> EventRegistry<A> {
    /// Create a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            listeners: RwLock::new(Listeners::new()),
            config,
        }
    }

    /// The registry's configuration.
    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Listeners<A>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Listeners<A>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(
        &self,
        kind: ListenerKind,
        event_name: String,
        callback: Callback<A>,
        filter: Option<Filter<A>>,
    ) -> EventResult<ListenerId> {
        let mut guard = self.write();
        let id = guard.allocate_id()?;
        let record = Arc::new(ListenerRecord::new(id, event_name, callback, filter));
        guard.insert(kind, Arc::clone(&record));
        drop(guard);

        debug!(event = record.event_name(), listener_id = %id, kind = %kind, "Listener registered");
        Ok(id)
    }

    /// Register a persistent listener.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::IdSpaceExhausted`] if no id is left to issue.
    pub fn listen<F>(
        &self,
        event_name: impl Into<String>,
        callback: F,
        filter: Option<Filter<A>>,
    ) -> EventResult<ListenerId>
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(
            ListenerKind::Persistent,
            event_name.into(),
            Box::new(callback),
            filter,
        )
    }

    /// Register a listener that is removed after its first dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::IdSpaceExhausted`] if no id is left to issue.
    pub fn listen_once<F>(
        &self,
        event_name: impl Into<String>,
        callback: F,
        filter: Option<Filter<A>>,
    ) -> EventResult<ListenerId>
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(
            ListenerKind::Once,
            event_name.into(),
            Box::new(callback),
            filter,
        )
    }

    /// Register a listener, once-only when `once` is set.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::IdSpaceExhausted`] if no id is left to issue.
    pub fn on<F>(
        &self,
        event_name: impl Into<String>,
        callback: F,
        filter: Option<Filter<A>>,
        once: bool,
    ) -> EventResult<ListenerId>
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(
            ListenerKind::from_once(once),
            event_name.into(),
            Box::new(callback),
            filter,
        )
    }

    /// Register several listeners in order.
    ///
    /// Ids are returned in the order of `specs`. If a registration fails,
    /// the ones before it stay registered.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn listen_multi(
        &self,
        specs: impl IntoIterator<Item = ListenerSpec<A>>,
    ) -> EventResult<Vec<ListenerId>> {
        specs
            .into_iter()
            .map(|spec| {
                self.register(
                    ListenerKind::from_once(spec.once),
                    spec.event_name,
                    spec.callback,
                    spec.filter,
                )
            })
            .collect()
    }

    fn cancel_in(&self, kind: ListenerKind, event_name: &str, id: ListenerId) -> bool {
        let (existed, removed) = self.write().remove_first(kind, event_name, id);
        if removed {
            debug!(event = event_name, listener_id = %id, kind = %kind, "Listener cancelled");
        }
        existed
    }

    /// Remove the first persistent listener for `event_name` with this id.
    ///
    /// Returns `false` only when the event has no persistent listeners. An
    /// id that matches nothing still returns `true`.
    pub fn cancel(&self, event_name: &str, id: ListenerId) -> bool {
        self.cancel_in(ListenerKind::Persistent, event_name, id)
    }

    /// Remove the first once-only listener for `event_name` with this id.
    ///
    /// Same return contract as [`cancel`](Self::cancel).
    pub fn cancel_once(&self, event_name: &str, id: ListenerId) -> bool {
        self.cancel_in(ListenerKind::Once, event_name, id)
    }

    /// Remove every listener, persistent and once-only, for `event_name`.
    ///
    /// Under [`CancelAllPolicy::Tolerant`] returns whether any listener was
    /// removed. Under [`CancelAllPolicy::Strict`] returns `true` once both
    /// entries are dropped.
    ///
    /// An entry is created by the first registration for the event in that
    /// mapping. It survives `cancel`, `cancel_once` and targeted dispatch
    /// draining its last record, and goes away with `cancel_all`,
    /// [`remove_all`](Self::remove_all), [`clear`](Self::clear) or an
    /// untargeted [`execute_once`](Self::execute_once) that drains it.
    ///
    /// # Errors
    ///
    /// Under [`CancelAllPolicy::Strict`] returns
    /// [`EventError::MissingMapping`] if either mapping has no entry for the
    /// event. Nothing is removed in that case.
    pub fn cancel_all(&self, event_name: &str) -> EventResult<bool> {
        let mut guard = self.write();
        let strict = self.config.cancel_all == CancelAllPolicy::Strict;
        if strict {
            for kind in [ListenerKind::Persistent, ListenerKind::Once] {
                if !guard.map(kind).entries.contains(event_name) {
                    return Err(EventError::MissingMapping {
                        event: event_name.to_owned(),
                        kind,
                    });
                }
            }
        }
        let removed = guard.remove_event(event_name);
        drop(guard);

        debug!(event = event_name, removed, "All listeners cancelled");
        Ok(strict || removed)
    }

    /// Remove every listener for `event_name`, whichever mappings hold it.
    ///
    /// Ignores the `cancel_all` policy. Returns whether anything was removed.
    pub fn remove_all(&self, event_name: &str) -> bool {
        let removed = self.write().remove_event(event_name);
        debug!(event = event_name, removed, "All listeners removed");
        removed
    }

    /// Cancel by optional id.
    ///
    /// Without an id this is [`cancel_all`](Self::cancel_all); with one it is
    /// [`cancel_once`](Self::cancel_once) or [`cancel`](Self::cancel) per
    /// `once`.
    ///
    /// # Errors
    ///
    /// Propagates [`cancel_all`](Self::cancel_all) errors.
    pub fn off(&self, event_name: &str, id: Option<ListenerId>, once: bool) -> EventResult<bool> {
        match id {
            None => self.cancel_all(event_name),
            Some(id) if once => Ok(self.cancel_once(event_name, id)),
            Some(id) => Ok(self.cancel(event_name, id)),
        }
    }

    /// Remove a listener from whichever mapping holds it.
    ///
    /// Returns `true` if a record was removed.
    pub fn remove(&self, event_name: &str, id: ListenerId) -> bool {
        let mut guard = self.write();
        let (_, persistent) = guard.remove_first(ListenerKind::Persistent, event_name, id);
        let (_, once) = guard.remove_first(ListenerKind::Once, event_name, id);
        drop(guard);

        let removed = persistent || once;
        if removed {
            debug!(event = event_name, listener_id = %id, "Listener removed");
        }
        removed
    }

    /// Snapshot the records a pass should visit, or `None` if nothing matches.
    fn snapshot(
        &self,
        kind: ListenerKind,
        event_name: &str,
        id: Option<ListenerId>,
    ) -> Option<Sequence<A>> {
        let guard = self.read();
        let seq = guard.map(kind).get(event_name)?;
        match id {
            Some(id) => seq
                .iter()
                .find(|r| r.id() == id)
                .map(|r| VecDeque::from([Arc::clone(r)])),
            None => Some(seq.clone()),
        }
    }

    /// Claim a record for dispatch.
    ///
    /// Persistent records must still be registered. Once-only records are
    /// taken out of the live sequence here, so a re-entrant dispatch can
    /// never run them a second time. Records are claimed in sequence order,
    /// so an untargeted once-only claim finds its record at the front.
    fn claim(&self, kind: ListenerKind, event_name: &str, id: ListenerId) -> bool {
        match kind {
            ListenerKind::Persistent => self.read().is_live(id),
            ListenerKind::Once => self.write().remove_first(kind, event_name, id).1,
        }
    }

    fn dispatch(
        &self,
        kind: ListenerKind,
        event_name: &str,
        id: Option<ListenerId>,
        args: &A,
    ) -> Pass {
        let Some(snapshot) = self.snapshot(kind, event_name, id) else {
            trace!(event = event_name, kind = %kind, "No listeners for event");
            return Pass::missed();
        };

        let mut failures = Vec::new();
        for record in snapshot {
            if !self.claim(kind, event_name, record.id()) {
                trace!(listener_id = %record.id(), "Listener cancelled during dispatch, skipping");
                continue;
            }

            match record.execute(args) {
                Ok(true) => {
                    trace!(
                        event = event_name,
                        listener_id = %record.id(),
                        kind = %kind,
                        "Listener dispatched"
                    );
                },
                Ok(false) => {
                    trace!(event = event_name, listener_id = %record.id(), "Listener filtered");
                },
                Err(source) => {
                    warn!(
                        event = event_name,
                        listener_id = %record.id(),
                        kind = %kind,
                        error = %source,
                        "Listener failed"
                    );
                    failures.push(ListenerFailure {
                        id: record.id(),
                        kind,
                        source,
                    });
                    if self.config.on_failure == FailurePolicy::Abort {
                        break;
                    }
                },
            }
        }

        if kind == ListenerKind::Once && id.is_none() {
            self.write().once_only.forget_if_drained(event_name);
        }

        Pass {
            matched: true,
            failures,
        }
    }

    fn finish(event_name: &str, passes: impl IntoIterator<Item = Pass>) -> EventResult<bool> {
        let mut matched = false;
        let mut failures = Vec::new();
        for pass in passes {
            matched |= pass.matched;
            failures.extend(pass.failures);
        }
        if failures.is_empty() {
            Ok(matched)
        } else {
            Err(EventError::Dispatch {
                event: event_name.to_owned(),
                failures,
            })
        }
    }

    /// Dispatch persistent listeners for `event_name`.
    ///
    /// With an id only the first matching listener runs. Returns `false`
    /// when the event has no persistent listeners or the id matched none.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Dispatch`] if any callback failed.
    pub fn execute(&self, event_name: &str, id: Option<ListenerId>, args: &A) -> EventResult<bool> {
        let pass = self.dispatch(ListenerKind::Persistent, event_name, id, args);
        Self::finish(event_name, [pass])
    }

    /// Dispatch once-only listeners for `event_name`, removing each one it
    /// runs.
    ///
    /// Same id and return semantics as [`execute`](Self::execute). Listeners
    /// skipped because a failure aborted the pass stay registered.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Dispatch`] if any callback failed.
    pub fn execute_once(
        &self,
        event_name: &str,
        id: Option<ListenerId>,
        args: &A,
    ) -> EventResult<bool> {
        let pass = self.dispatch(ListenerKind::Once, event_name, id, args);
        Self::finish(event_name, [pass])
    }

    /// Dispatch persistent listeners, then once-only listeners.
    ///
    /// Returns `true` if either pass found a listener.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Dispatch`] carrying the failures of both passes.
    /// Under [`FailurePolicy::Abort`] a failure in the persistent pass skips
    /// the once-only pass.
    pub fn call(&self, event_name: &str, id: Option<ListenerId>, args: &A) -> EventResult<bool> {
        let persistent = self.dispatch(ListenerKind::Persistent, event_name, id, args);
        if self.config.on_failure == FailurePolicy::Abort && !persistent.failures.is_empty() {
            return Self::finish(event_name, [persistent]);
        }
        let once = self.dispatch(ListenerKind::Once, event_name, id, args);
        Self::finish(event_name, [persistent, once])
    }

    /// Number of listeners registered for `event_name` across both mappings.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        let guard = self.read();
        let persistent = guard.persistent.get(event_name).map_or(0, VecDeque::len);
        let once = guard.once_only.get(event_name).map_or(0, VecDeque::len);
        persistent.saturating_add(once)
    }

    /// Whether any listener is registered for `event_name`.
    #[must_use]
    pub fn contains(&self, event_name: &str) -> bool {
        let guard = self.read();
        guard.persistent.sequences.contains_key(event_name)
            || guard.once_only.sequences.contains_key(event_name)
    }

    /// Event names with at least one listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let guard = self.read();
        guard
            .persistent
            .sequences
            .keys()
            .chain(guard.once_only.sequences.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Total number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().live.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().live.is_empty()
    }

    /// Remove every listener. Issued ids are not reused afterwards.
    pub fn clear(&self) {
        self.write().clear();
        debug!("All listeners cleared");
    }
}
