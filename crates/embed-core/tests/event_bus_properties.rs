//! Integration tests for the event bus through the public API.
//!
//! These tests drive long mixed sequences of `on` / `once` / `off` / `emit`
//! and check that the bus's counts always agree with a simple model of what
//! should be registered, and that emission invokes exactly that set in order.

use std::sync::{Arc, Mutex};

use embed_core::{listener, ContextId, EventBus, Listener, ListenerFilter};

/// What the test believes is registered for one event.
#[derive(Clone)]
struct ModelEntry {
    tag: usize,
    once: bool,
    context: Option<ContextId>,
}

struct Harness {
    bus: EventBus<()>,
    log: Arc<Mutex<Vec<usize>>>,
    listeners: Vec<Listener<()>>,
    model: Vec<ModelEntry>,
}

impl Harness {
    fn new(listener_pool: usize) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let listeners = (0..listener_pool)
            .map(|tag| {
                let log = Arc::clone(&log);
                listener(move |_: &()| log.lock().unwrap().push(tag))
            })
            .collect();
        Self {
            bus: EventBus::new(),
            log,
            listeners,
            model: Vec::new(),
        }
    }

    fn on(&mut self, tag: usize, context: Option<ContextId>) {
        match context {
            Some(ctx) => self
                .bus
                .on_with_context("e", Arc::clone(&self.listeners[tag]), ctx),
            None => self.bus.on("e", Arc::clone(&self.listeners[tag])),
        };
        self.model.push(ModelEntry {
            tag,
            once: false,
            context,
        });
    }

    fn once(&mut self, tag: usize) {
        self.bus.once("e", Arc::clone(&self.listeners[tag]));
        self.model.push(ModelEntry {
            tag,
            once: true,
            context: None,
        });
    }

    fn off(&mut self, tag: usize) {
        self.bus.remove_listener("e", &self.listeners[tag]);
        self.model.retain(|entry| entry.tag != tag);
    }

    fn off_once(&mut self, tag: usize) {
        self.bus
            .off("e", ListenerFilter::listener(&self.listeners[tag]).once_only());
        self.model.retain(|entry| !(entry.tag == tag && entry.once));
    }

    fn off_context(&mut self, tag: usize, ctx: ContextId) {
        self.bus.off(
            "e",
            ListenerFilter::listener(&self.listeners[tag]).with_context(ctx),
        );
        self.model
            .retain(|entry| !(entry.tag == tag && entry.context == Some(ctx)));
    }

    /// Emits and checks the invoked tags against the model.
    fn emit_and_check(&mut self) {
        self.log.lock().unwrap().clear();
        let expected: Vec<usize> = self.model.iter().map(|entry| entry.tag).collect();

        let had_listeners = self.bus.emit("e", &());

        assert_eq!(had_listeners, !expected.is_empty());
        assert_eq!(*self.log.lock().unwrap(), expected);
        self.model.retain(|entry| !entry.once);
        self.check_counts();
    }

    fn check_counts(&self) {
        assert_eq!(self.bus.listener_count("e"), self.model.len());
        assert_eq!(self.bus.total_listener_count(), self.model.len());
        assert_eq!(self.bus.listeners("e").len(), self.model.len());
        assert_eq!(self.bus.event_names().is_empty(), self.model.is_empty());
    }
}

#[test]
fn test_counts_track_a_mixed_sequence_of_operations() {
    let mut h = Harness::new(4);
    let ctx = ContextId::new();

    h.on(0, None);
    h.once(1);
    h.on(2, Some(ctx));
    h.on(0, None);
    h.check_counts();
    h.emit_and_check();

    h.once(3);
    h.once(0);
    h.off_once(0);
    h.check_counts();
    h.emit_and_check();

    h.off(0);
    h.check_counts();
    h.emit_and_check();

    h.off_context(2, ctx);
    h.check_counts();
    h.emit_and_check();
}

#[test]
fn test_deterministic_pseudo_random_sequences_match_model() {
    // A tiny linear congruential generator keeps the sequence reproducible
    // without pulling in a randomness crate.
    let mut seed: u64 = 0x5EED;
    let mut next = move |bound: u64| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) % bound
    };

    let mut h = Harness::new(5);
    let contexts = [ContextId::new(), ContextId::new()];

    for _ in 0..500 {
        let tag = next(5) as usize;
        match next(7) {
            0 | 1 => h.on(tag, None),
            2 => h.on(tag, Some(contexts[next(2) as usize])),
            3 => h.once(tag),
            4 => h.off(tag),
            5 => h.off_context(tag, contexts[next(2) as usize]),
            _ => h.emit_and_check(),
        }
        h.check_counts();
    }
}

#[test]
fn test_once_listener_never_fires_twice_under_nested_emission() {
    // Arrange: three nested levels of re-emission, one one-shot listener.
    let bus = Arc::new(EventBus::<u32>::new());
    let fired = Arc::new(Mutex::new(0u32));

    let bus_in = Arc::clone(&bus);
    bus.on(
        "online",
        listener(move |depth: &u32| {
            if *depth < 3 {
                bus_in.emit("online", &(depth + 1));
            }
        }),
    );
    let fired_in = Arc::clone(&fired);
    bus.once(
        "online",
        listener(move |_: &u32| *fired_in.lock().unwrap() += 1),
    );

    // Act
    bus.emit("online", &0);
    bus.emit("online", &0);

    // Assert
    assert_eq!(*fired.lock().unwrap(), 1);
    assert_eq!(bus.listener_count("online"), 1);
}
