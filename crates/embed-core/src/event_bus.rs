//! Ordered publish/subscribe registry.
//!
//! [`EventBus`] maps an event name to the ordered list of listeners registered
//! for it.  It has no knowledge of the embed protocol: the host session uses it
//! to republish domain events, but any payload type works.
//!
//! # Ordering and one-shot listeners
//!
//! `emit` takes a snapshot of the registrations for the event, releases the
//! lock, and then walks the snapshot in registration order.  A one-shot
//! registration is removed from the registry *before* its listener runs, and
//! only the call that actually removed it gets to invoke it.  That makes a
//! `once` listener fire at most once even when a listener re-emits the same
//! event from inside its own callback.
//!
//! # Listener identity
//!
//! Rust closures have no identity of their own, so listeners are stored as
//! [`Listener`] (`Arc<dyn Fn>`) and compared with [`Arc::ptr_eq`].  Keep the
//! `Arc` you registered if you want to remove it later.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use embed_core::event_bus::{listener, EventBus};
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let total = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&total);
//! bus.on("tick", listener(move |n: &u32| {
//!     sink.fetch_add(*n as usize, Ordering::SeqCst);
//! }));
//!
//! assert!(bus.emit("tick", &3));
//! assert!(!bus.emit("tock", &3));
//! assert_eq!(total.load(Ordering::SeqCst), 3);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;
use uuid::Uuid;

/// A registered callback.  Compared by pointer identity.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Wraps a closure into a [`Listener`].
pub fn listener<T, F>(f: F) -> Listener<T>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Opaque owner tag attached to a registration.
///
/// The owner context lets one component remove only the listeners it
/// registered, even if another component registered the same `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Creates a fresh, unique context tag.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which registrations an [`EventBus::off`] call should remove.
///
/// The default filter matches every registration for the event.
pub struct ListenerFilter<'a, T> {
    /// Only registrations of this exact listener (pointer identity).
    pub listener: Option<&'a Listener<T>>,
    /// Only registrations made with this owner context.
    pub context: Option<ContextId>,
    /// Only one-shot registrations.
    pub once_only: bool,
}

impl<T> Default for ListenerFilter<'_, T> {
    fn default() -> Self {
        Self {
            listener: None,
            context: None,
            once_only: false,
        }
    }
}

impl<'a, T> ListenerFilter<'a, T> {
    /// Matches registrations of `listener`.
    pub fn listener(listener: &'a Listener<T>) -> Self {
        Self {
            listener: Some(listener),
            ..Self::default()
        }
    }

    /// Narrows the filter to registrations owned by `context`.
    pub fn with_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }

    /// Narrows the filter to one-shot registrations.
    pub fn once_only(mut self) -> Self {
        self.once_only = true;
        self
    }

    fn matches(&self, registration: &Registration<T>) -> bool {
        // No listener means "everything registered under this name".
        let Some(listener) = self.listener else {
            return true;
        };
        if !Arc::ptr_eq(listener, &registration.listener) {
            return false;
        }
        if self.once_only && !registration.once {
            return false;
        }
        match self.context {
            Some(context) => registration.context == Some(context),
            None => true,
        }
    }
}

struct Registration<T> {
    id: u64,
    listener: Listener<T>,
    context: Option<ContextId>,
    once: bool,
}

// Manual impl: `T` itself does not need to be `Clone`.
impl<T> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
            context: self.context,
            once: self.once,
        }
    }
}

struct Topic<T> {
    /// Order in which the event name first appeared; drives `event_names`.
    first_seen: u64,
    registrations: Vec<Registration<T>>,
}

struct Registry<T> {
    topics: HashMap<String, Topic<T>>,
    /// Number of (event, listener) registrations across all topics.
    total: usize,
    next_id: u64,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            topics: HashMap::new(),
            total: 0,
            next_id: 0,
        }
    }

    fn insert(
        &mut self,
        event: String,
        listener: Listener<T>,
        context: Option<ContextId>,
        once: bool,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        let topic = self.topics.entry(event).or_insert_with(|| Topic {
            first_seen: id,
            registrations: Vec::new(),
        });
        topic.registrations.push(Registration {
            id,
            listener,
            context,
            once,
        });
        self.total += 1;
    }

    /// Removes the registration with `id`; returns `false` if it was already gone.
    fn take(&mut self, event: &str, id: u64) -> bool {
        let Some(topic) = self.topics.get_mut(event) else {
            return false;
        };
        let Some(index) = topic.registrations.iter().position(|r| r.id == id) else {
            return false;
        };
        topic.registrations.remove(index);
        self.total -= 1;
        if topic.registrations.is_empty() {
            self.topics.remove(event);
        }
        true
    }
}

/// Ordered, thread-safe publish/subscribe registry keyed by event name.
///
/// An event name with no listeners is never present in the registry, so
/// [`event_names`](Self::event_names) only reports live topics.
pub struct EventBus<T> {
    registry: Mutex<Registry<T>>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_names", &self.event_names())
            .field("total_listeners", &self.total_listener_count())
            .finish()
    }
}

impl<T> EventBus<T> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
        }
    }

    // Listeners never run while the lock is held, so the registry behind a
    // poisoned lock is still consistent.
    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` for every future emission of `event`.
    pub fn on(&self, event: impl Into<String>, listener: Listener<T>) -> &Self {
        self.registry().insert(event.into(), listener, None, false);
        self
    }

    /// Like [`on`](Self::on), tagging the registration with an owner context.
    pub fn on_with_context(
        &self,
        event: impl Into<String>,
        listener: Listener<T>,
        context: ContextId,
    ) -> &Self {
        self.registry()
            .insert(event.into(), listener, Some(context), false);
        self
    }

    /// Registers `listener` for the next emission of `event` only.
    pub fn once(&self, event: impl Into<String>, listener: Listener<T>) -> &Self {
        self.registry().insert(event.into(), listener, None, true);
        self
    }

    /// Like [`once`](Self::once), tagging the registration with an owner context.
    pub fn once_with_context(
        &self,
        event: impl Into<String>,
        listener: Listener<T>,
        context: ContextId,
    ) -> &Self {
        self.registry()
            .insert(event.into(), listener, Some(context), true);
        self
    }

    /// Removes the registrations for `event` that match `filter`.
    ///
    /// With the default filter every listener for `event` is removed.
    /// Registrations that do not match are kept in their original order.
    /// Returns the number of registrations removed.
    pub fn off(&self, event: &str, filter: ListenerFilter<'_, T>) -> usize {
        let mut registry = self.registry();
        let Some(topic) = registry.topics.get_mut(event) else {
            return 0;
        };
        let before = topic.registrations.len();
        topic.registrations.retain(|r| !filter.matches(r));
        let removed = before - topic.registrations.len();
        if topic.registrations.is_empty() {
            registry.topics.remove(event);
        }
        registry.total -= removed;
        removed
    }

    /// Removes every registration of `listener` for `event`.
    pub fn remove_listener(&self, event: &str, listener: &Listener<T>) -> usize {
        self.off(event, ListenerFilter::listener(listener))
    }

    /// Synchronously invokes every listener registered for `event`.
    ///
    /// Listeners run in registration order, outside the registry lock, so they
    /// may freely register, remove, or emit.  Returns `false` (and does
    /// nothing) when `event` has no listeners.
    pub fn emit(&self, event: &str, payload: &T) -> bool {
        let snapshot: Vec<Registration<T>> = match self.registry().topics.get(event) {
            Some(topic) => topic.registrations.clone(),
            None => return false,
        };
        trace!(event, listeners = snapshot.len(), "emitting");

        for registration in snapshot {
            // Only the emission that removed a one-shot registration invokes it.
            if registration.once && !self.registry().take(event, registration.id) {
                continue;
            }
            (registration.listener)(payload);
        }
        true
    }

    /// Number of registrations for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry()
            .topics
            .get(event)
            .map_or(0, |topic| topic.registrations.len())
    }

    /// Number of registrations across all events.
    pub fn total_listener_count(&self) -> usize {
        self.registry().total
    }

    /// The listeners registered for `event`, in registration order.
    pub fn listeners(&self, event: &str) -> Vec<Listener<T>> {
        self.registry()
            .topics
            .get(event)
            .map(|topic| {
                topic
                    .registrations
                    .iter()
                    .map(|r| Arc::clone(&r.listener))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of all events with at least one listener, oldest first.
    pub fn event_names(&self) -> Vec<String> {
        let registry = self.registry();
        let mut names: Vec<(u64, &String)> = registry
            .topics
            .iter()
            .map(|(name, topic)| (topic.first_seen, name))
            .collect();
        names.sort_by_key(|(first_seen, _)| *first_seen);
        names.into_iter().map(|(_, name)| name.clone()).collect()
    }

    /// Clears the whole registry.
    pub fn remove_all_listeners(&self) {
        let mut registry = self.registry();
        registry.topics.clear();
        registry.total = 0;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Builds a listener that appends `tag` to a shared call log.
    fn recorder(log: &Arc<StdMutex<Vec<String>>>, tag: &str) -> Listener<i32> {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        listener(move |value: &i32| log.lock().unwrap().push(format!("{tag}:{value}")))
    }

    fn new_log() -> Arc<StdMutex<Vec<String>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    #[test]
    fn test_emit_without_listeners_returns_false() {
        let bus: EventBus<i32> = EventBus::new();
        assert!(!bus.emit("ready", &1));
        assert!(bus.event_names().is_empty());
    }

    #[test]
    fn test_emit_invokes_listeners_in_registration_order() {
        // Arrange
        let bus = EventBus::new();
        let log = new_log();
        bus.on("play", recorder(&log, "a"));
        bus.on("play", recorder(&log, "b"));
        bus.on("play", recorder(&log, "c"));

        // Act
        let had_listeners = bus.emit("play", &7);

        // Assert
        assert!(had_listeners);
        assert_eq!(*log.lock().unwrap(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn test_single_and_multiple_listeners_count_the_same_way() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("one", recorder(&log, "x"));
        bus.on("many", recorder(&log, "x"));
        bus.on("many", recorder(&log, "y"));

        assert_eq!(bus.listener_count("one"), 1);
        assert_eq!(bus.listener_count("many"), 2);
        assert_eq!(bus.listeners("one").len(), 1);
        assert_eq!(bus.listeners("many").len(), 2);
        assert_eq!(bus.total_listener_count(), 3);
    }

    #[test]
    fn test_once_listener_fires_only_once() {
        // Arrange
        let bus = EventBus::new();
        let log = new_log();
        bus.once("ready", recorder(&log, "once"));
        bus.on("ready", recorder(&log, "always"));

        // Act
        bus.emit("ready", &1);
        bus.emit("ready", &2);

        // Assert
        assert_eq!(
            *log.lock().unwrap(),
            vec!["once:1", "always:1", "always:2"]
        );
        assert_eq!(bus.listener_count("ready"), 1);
    }

    #[test]
    fn test_once_listener_is_removed_before_it_runs() {
        let bus = Arc::new(EventBus::new());
        let seen_count = Arc::new(StdMutex::new(None));

        let bus_in = Arc::clone(&bus);
        let seen = Arc::clone(&seen_count);
        bus.once(
            "ended",
            listener(move |_: &i32| {
                *seen.lock().unwrap() = Some(bus_in.listener_count("ended"));
            }),
        );

        bus.emit("ended", &0);

        // The registration was already gone while the listener ran.
        assert_eq!(*seen_count.lock().unwrap(), Some(0));
        assert!(bus.event_names().is_empty());
    }

    #[test]
    fn test_reentrant_emit_does_not_refire_once_listener() {
        // Arrange: the first listener re-emits the same event once.
        let bus = Arc::new(EventBus::new());
        let log = new_log();
        let depth = Arc::new(StdMutex::new(0));

        let bus_in = Arc::clone(&bus);
        let depth_in = Arc::clone(&depth);
        bus.on(
            "online",
            listener(move |value: &i32| {
                let mut d = depth_in.lock().unwrap();
                if *d == 0 {
                    *d += 1;
                    drop(d);
                    bus_in.emit("online", &(value + 100));
                }
            }),
        );
        bus.once("online", recorder(&log, "once"));

        // Act
        bus.emit("online", &1);

        // Assert: the inner emission consumed the one-shot listener; the outer
        // emission skipped it.
        assert_eq!(*log.lock().unwrap(), vec!["once:101"]);
        assert_eq!(bus.listener_count("online"), 1);
    }

    #[test]
    fn test_off_without_listener_removes_whole_event() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("pause", recorder(&log, "a"));
        bus.once("pause", recorder(&log, "b"));
        bus.on("play", recorder(&log, "c"));

        let removed = bus.off("pause", ListenerFilter::default());

        assert_eq!(removed, 2);
        assert_eq!(bus.listener_count("pause"), 0);
        assert_eq!(bus.event_names(), vec!["play".to_string()]);
        assert_eq!(bus.total_listener_count(), 1);
    }

    #[test]
    fn test_off_by_listener_keeps_other_registrations_in_order() {
        // Arrange
        let bus = EventBus::new();
        let log = new_log();
        let target = recorder(&log, "target");
        bus.on("play", recorder(&log, "first"));
        bus.on("play", Arc::clone(&target));
        bus.on("play", recorder(&log, "last"));

        // Act
        let removed = bus.remove_listener("play", &target);
        bus.emit("play", &0);

        // Assert
        assert_eq!(removed, 1);
        assert_eq!(*log.lock().unwrap(), vec!["first:0", "last:0"]);
    }

    #[test]
    fn test_off_once_filter_only_removes_one_shot_registrations() {
        let bus = EventBus::new();
        let log = new_log();
        let shared = recorder(&log, "shared");
        bus.on("error", Arc::clone(&shared));
        bus.once("error", Arc::clone(&shared));

        let removed = bus.off("error", ListenerFilter::listener(&shared).once_only());

        assert_eq!(removed, 1);
        assert_eq!(bus.listener_count("error"), 1);
        bus.emit("error", &5);
        bus.emit("error", &6);
        assert_eq!(*log.lock().unwrap(), vec!["shared:5", "shared:6"]);
    }

    #[test]
    fn test_off_context_filter_only_removes_matching_owner() {
        let bus = EventBus::new();
        let log = new_log();
        let shared = recorder(&log, "shared");
        let mine = ContextId::new();
        let theirs = ContextId::new();
        bus.on_with_context("captions", Arc::clone(&shared), mine);
        bus.on_with_context("captions", Arc::clone(&shared), theirs);

        let removed = bus.off(
            "captions",
            ListenerFilter::listener(&shared).with_context(mine),
        );

        assert_eq!(removed, 1);
        assert_eq!(bus.listener_count("captions"), 1);
    }

    #[test]
    fn test_off_with_unknown_listener_changes_nothing() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("play", recorder(&log, "a"));
        let stranger = recorder(&log, "a");

        assert_eq!(bus.remove_listener("play", &stranger), 0);
        assert_eq!(bus.remove_listener("missing", &stranger), 0);
        assert_eq!(bus.listener_count("play"), 1);
        assert_eq!(bus.total_listener_count(), 1);
    }

    #[test]
    fn test_event_names_follow_first_registration_order() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("ready", recorder(&log, "a"));
        bus.on("play", recorder(&log, "b"));
        bus.on("ready", recorder(&log, "c"));
        bus.on("ended", recorder(&log, "d"));

        assert_eq!(bus.event_names(), vec!["ready", "play", "ended"]);
    }

    #[test]
    fn test_remove_all_listeners_resets_count() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("a", recorder(&log, "a"));
        bus.once("b", recorder(&log, "b"));

        bus.remove_all_listeners();

        assert_eq!(bus.total_listener_count(), 0);
        assert!(bus.event_names().is_empty());
        assert!(!bus.emit("a", &1));
    }

    #[test]
    fn test_listener_removed_mid_emission_still_runs_for_that_emission() {
        // Arrange: the first listener removes the second one.
        let bus = Arc::new(EventBus::new());
        let log = new_log();
        let second = recorder(&log, "second");

        let bus_in = Arc::clone(&bus);
        let second_in = Arc::clone(&second);
        bus.on(
            "play",
            listener(move |_: &i32| {
                bus_in.remove_listener("play", &second_in);
            }),
        );
        bus.on("play", Arc::clone(&second));

        // Act
        bus.emit("play", &1);
        bus.emit("play", &2);

        // Assert: the snapshot taken at the start of the first emission still
        // contained it; the second emission did not.
        assert_eq!(*log.lock().unwrap(), vec!["second:1"]);
    }

    #[test]
    fn test_debug_output_lists_event_names() {
        let bus = EventBus::new();
        let log = new_log();
        bus.on("ready", recorder(&log, "a"));
        let rendered = format!("{bus:?}");
        assert!(rendered.contains("ready"));
        assert!(rendered.contains("total_listeners: 1"));
    }

    #[test]
    fn test_panicking_once_listener_leaves_registry_consistent() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::sync::atomic::{AtomicUsize, Ordering};

        // Arrange
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.once("error", listener(|_: &i32| panic!("listener failed")));
        bus.on(
            "error",
            listener(move |_: &i32| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        // Act
        let result = catch_unwind(AssertUnwindSafe(|| bus.emit("error", &1)));

        // Assert: the one-shot was removed before it ran, and the lock is usable.
        assert!(result.is_err());
        assert_eq!(bus.listener_count("error"), 1);
        assert_eq!(bus.total_listener_count(), 1);
        assert!(bus.emit("error", &2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
