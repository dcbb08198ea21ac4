//! The demo scenario: sensors joining, emitting and leaving a multiplexer.
//!
//! Half of the sensors are added before anyone subscribes and the rest
//! after, so the run exercises both eager and late relay attachment. The
//! first sensor is removed at the end and emits once more, which must not
//! reach the multiplexer's subscribers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, info};

use confluence_events::{Emitter, Handler, ListenerId, Observable};
use confluence_mux::{Lifecycle, Multiplexer};

use crate::config::DemoConfig;

/// A named event source emitting readings.
pub struct Sensor {
    /// Display name, unique within a run.
    pub name: String,
    events: Emitter<u64>,
}

impl Sensor {
    /// Create a sensor with no listeners.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            events: Emitter::new(),
        })
    }

    /// Emit `reading` under `event` to this sensor's own listeners.
    pub fn emit(&self, event: &str, reading: u64) -> usize {
        self.events.emit(event, &reading)
    }

    /// Return the number of listeners this sensor has for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.events.listener_count(event)
    }
}

impl Observable<u64> for Sensor {
    fn subscribe(&self, event: &str, handler: Handler<u64>) -> ListenerId {
        self.events.subscribe(event, handler)
    }

    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        self.events.unsubscribe(event, id)
    }
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Relayed events received by the subscriber, per sensor.
    pub per_sensor: IndexMap<String, u64>,
    /// Relayed events received after the first sensor was removed.
    pub after_removal: u64,
    /// Lifecycle notifications observed (added, removed).
    pub lifecycle: (u64, u64),
    /// Listeners still attached to any sensor after teardown.
    pub leftover_relays: usize,
}

impl Report {
    /// Return the total number of relayed events received.
    pub fn relayed(&self) -> u64 {
        self.per_sensor.values().fold(0, |acc, n| acc.saturating_add(*n))
    }
}

/// Run the scenario described by `config`.
pub fn run(config: &DemoConfig) -> Report {
    let event = config.event.as_str();
    let mux = Multiplexer::<Sensor, u64>::new();
    let sensors: Vec<Rc<Sensor>> = (0..config.sources)
        .map(|i| Sensor::new(format!("sensor-{i}")))
        .collect();

    let added = Rc::new(Cell::new(0_u64));
    let removed = Rc::new(Cell::new(0_u64));
    watch_lifecycle(&mux, Lifecycle::ObjectAdded, &added);
    watch_lifecycle(&mux, Lifecycle::ObjectRemoved, &removed);

    let (early, late) = sensors.split_at(sensors.len().div_ceil(2));
    mux.add_many(early);

    let tallies: Rc<RefCell<IndexMap<String, u64>>> = Rc::new(RefCell::new(IndexMap::new()));
    let subscription = {
        let tallies = Rc::clone(&tallies);
        mux.subscribe_fn(event, move |relayed| {
            debug!(sensor = %relayed.source.name, reading = relayed.args, "Relayed reading");
            let mut tallies = tallies.borrow_mut();
            let count = tallies.entry(relayed.source.name.clone()).or_insert(0);
            *count = count.saturating_add(1);
        })
    };
    mux.add_many(late);
    info!(sensors = mux.len(), event, "Sensors registered");

    for round in 0..config.rounds {
        for sensor in &sensors {
            sensor.emit(event, round);
        }
    }

    let before_removal = relayed_total(&tallies);
    if let Some(first) = sensors.first() {
        mux.remove(first);
        first.emit(event, config.rounds);
    }
    let after_removal = relayed_total(&tallies).saturating_sub(before_removal);

    mux.unsubscribe(event, subscription);
    let leftover_relays: usize = sensors
        .iter()
        .map(|sensor| sensor.listener_count(event))
        .sum();
    info!(leftover_relays, "Subscriber removed");

    let per_sensor = tallies.borrow().clone();
    Report {
        per_sensor,
        after_removal,
        lifecycle: (added.get(), removed.get()),
        leftover_relays,
    }
}

/// Log and count one kind of membership notification.
fn watch_lifecycle(mux: &Multiplexer<Sensor, u64>, kind: Lifecycle, counter: &Rc<Cell<u64>>) {
    let counter = Rc::clone(counter);
    mux.subscribe_lifecycle_fn(kind, move |sensor| {
        info!(sensor = %sensor.name, notification = %kind, "Membership changed");
        counter.set(counter.get().saturating_add(1));
    });
}

fn relayed_total(tallies: &Rc<RefCell<IndexMap<String, u64>>>) -> u64 {
    tallies
        .borrow()
        .values()
        .fold(0, |acc, n| acc.saturating_add(*n))
}
