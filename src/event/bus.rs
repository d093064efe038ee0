use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::Instant;

use crate::config::NotificationConfig;
use crate::engine::ObjectId;
use crate::event::{DebouncedSignal, EditorEvent, EventChannel};

/// Callback registered on a single channel
pub type EventCallback = Box<dyn Fn(&EditorEvent)>;

struct Subscriber {
    id: u64,
    callback: EventCallback,
}

/// Token identifying one subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    channel: EventChannel,
    id: u64,
}

/// Typed publish/subscribe bus decoupling mutation sources from their
/// consumers.
///
/// Delivery is synchronous and FIFO per channel for a given publish;
/// subscribers joining afterwards do not see past events. A panicking
/// subscriber is isolated and logged so the rest of the channel still gets
/// the event. After [`destroy`](Self::destroy), publishes, emits and pumps
/// are no-ops.
pub struct EventBus {
    channels: RefCell<HashMap<EventChannel, Vec<Rc<Subscriber>>>>,
    aggregate: DebouncedSignal,
    next_id: Cell<u64>,
    closed: Cell<bool>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self.channels.borrow().values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscribers", &format!("<{count} handlers>"))
            .field("closed", &self.closed.get())
            .finish()
    }
}

impl EventBus {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            channels: RefCell::new(HashMap::new()),
            aggregate: DebouncedSignal::new(config.debounce),
            next_id: Cell::new(0),
            closed: Cell::new(false),
        }
    }

    /// Subscribe a callback to one channel
    pub fn subscribe(&self, channel: EventChannel, callback: EventCallback) -> SubscriptionHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.channels
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Rc::new(Subscriber { id, callback }));
        SubscriptionHandle { channel, id }
    }

    /// Remove a subscription; unknown handles are ignored
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Some(subscribers) = self.channels.borrow_mut().get_mut(&handle.channel) {
            subscribers.retain(|s| s.id != handle.id);
        }
    }

    /// Broadcast an event to its channel's subscribers
    pub fn publish(&self, event: EditorEvent) {
        if self.closed.get() {
            return;
        }
        let channel = event.channel();
        if is_qualifying(channel) {
            self.aggregate.mark();
        }
        // Snapshot before fan-out so handlers may subscribe, unsubscribe or
        // publish again without poisoning the iteration.
        let subscribers: Vec<Rc<Subscriber>> = self
            .channels
            .borrow()
            .get(&channel)
            .map(|s| s.to_vec())
            .unwrap_or_default();
        for subscriber in subscribers {
            if catch_unwind(AssertUnwindSafe(|| (subscriber.callback)(&event))).is_err() {
                log::warn!("subscriber on {channel:?} panicked; continuing delivery");
            }
        }
    }

    /// Fire the aggregate-change channel if the debounce window has elapsed
    /// since the last qualifying event. Call once per host tick.
    pub fn pump(&self, now: Instant) {
        if self.closed.get() {
            return;
        }
        if self.aggregate.poll(now) {
            self.publish(EditorEvent::AggregateChange);
        }
    }

    pub fn emit_history_changed(&self, can_undo: bool, can_redo: bool) {
        self.publish(EditorEvent::HistoryChanged { can_undo, can_redo });
    }

    pub fn emit_zoom_changed(&self, level: f32) {
        self.publish(EditorEvent::ZoomChanged { level });
    }

    pub fn emit_object_locked(&self, id: ObjectId) {
        self.publish(EditorEvent::ObjectLocked { id });
    }

    pub fn emit_object_unlocked(&self, id: ObjectId) {
        self.publish(EditorEvent::ObjectUnlocked { id });
    }

    /// Drop every subscriber and close the bus
    pub fn destroy(&self) {
        self.closed.set(true);
        self.channels.borrow_mut().clear();
        self.aggregate.reset();
    }

    pub fn on_object_added(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ObjectAdded,
            Box::new(move |event| {
                if let EditorEvent::ObjectAdded { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_object_removed(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ObjectRemoved,
            Box::new(move |event| {
                if let EditorEvent::ObjectRemoved { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_object_modified(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ObjectModified,
            Box::new(move |event| {
                if let EditorEvent::ObjectModified { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_object_locked(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ObjectLocked,
            Box::new(move |event| {
                if let EditorEvent::ObjectLocked { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_object_unlocked(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ObjectUnlocked,
            Box::new(move |event| {
                if let EditorEvent::ObjectUnlocked { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_text_changed(&self, callback: impl Fn(ObjectId) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::TextChanged,
            Box::new(move |event| {
                if let EditorEvent::TextChanged { id } = event {
                    callback(*id);
                }
            }),
        )
    }

    pub fn on_selection_changed(
        &self,
        callback: impl Fn(&[ObjectId]) + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::SelectionChanged,
            Box::new(move |event| {
                if let EditorEvent::SelectionChanged { selected } = event {
                    callback(selected);
                }
            }),
        )
    }

    pub fn on_history_changed(
        &self,
        callback: impl Fn(bool, bool) + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::HistoryChanged,
            Box::new(move |event| {
                if let EditorEvent::HistoryChanged { can_undo, can_redo } = event {
                    callback(*can_undo, *can_redo);
                }
            }),
        )
    }

    pub fn on_zoom_changed(&self, callback: impl Fn(f32) + 'static) -> SubscriptionHandle {
        self.subscribe(
            EventChannel::ZoomChanged,
            Box::new(move |event| {
                if let EditorEvent::ZoomChanged { level } = event {
                    callback(*level);
                }
            }),
        )
    }

    pub fn on_pre_render(&self, callback: impl Fn() + 'static) -> SubscriptionHandle {
        self.subscribe(EventChannel::PreRender, Box::new(move |_| callback()))
    }

    /// Subscribe to the debounced aggregate-change channel. Signal only; it
    /// fires at most once per debounce window, after the last qualifying
    /// mutation in a burst.
    pub fn on_aggregate_change(&self, callback: impl Fn() + 'static) -> SubscriptionHandle {
        self.subscribe(EventChannel::AggregateChange, Box::new(move |_| callback()))
    }
}

/// Events that arm the aggregate-change debouncer
fn is_qualifying(channel: EventChannel) -> bool {
    matches!(
        channel,
        EventChannel::ObjectAdded
            | EventChannel::ObjectRemoved
            | EventChannel::ObjectModified
            | EventChannel::ObjectLocked
            | EventChannel::ObjectUnlocked
            | EventChannel::TextChanged
    )
}
