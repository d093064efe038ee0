use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use easel::{EditorEvent, EventBus, EventChannel, NotificationConfig, ObjectId};

fn bus_with_debounce(debounce: Duration) -> EventBus {
    EventBus::new(NotificationConfig { debounce })
}

fn bus() -> EventBus {
    EventBus::new(NotificationConfig::default())
}

#[test]
fn delivery_is_fifo_per_channel() {
    let bus = bus();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        bus.on_object_added(move |_| order.borrow_mut().push(tag));
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn events_only_reach_their_own_channel() {
    let bus = bus();
    let added = Rc::new(Cell::new(0));
    let removed = Rc::new(Cell::new(0));
    {
        let added = added.clone();
        bus.on_object_added(move |_| added.set(added.get() + 1));
    }
    {
        let removed = removed.clone();
        bus.on_object_removed(move |_| removed.set(removed.get() + 1));
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!((added.get(), removed.get()), (1, 0));
}

#[test]
fn a_panicking_subscriber_does_not_block_the_rest() {
    let bus = bus();
    let reached = Rc::new(Cell::new(false));
    bus.on_object_added(|_| panic!("misbehaving observer"));
    {
        let reached = reached.clone();
        bus.on_object_added(move |_| reached.set(true));
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert!(reached.get());
}

#[test]
fn unsubscribe_stops_delivery() {
    let bus = bus();
    let count = Rc::new(Cell::new(0));
    let handle = {
        let count = count.clone();
        bus.on_object_added(move |_| count.set(count.get() + 1))
    };
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    bus.unsubscribe(handle);
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!(count.get(), 1);
}

#[test]
fn subscribing_during_delivery_misses_the_current_event() {
    let bus = Rc::new(bus());
    let late_calls = Rc::new(Cell::new(0));
    {
        let bus = bus.clone();
        let late_calls = late_calls.clone();
        bus.clone().on_object_added(move |_| {
            let late_calls = late_calls.clone();
            bus.on_object_added(move |_| late_calls.set(late_calls.get() + 1));
        });
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!(late_calls.get(), 0);
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!(late_calls.get(), 1);
}

#[test]
fn reentrant_publish_from_a_handler_is_delivered() {
    let bus = Rc::new(bus());
    let seen = Rc::new(Cell::new(false));
    {
        let bus = bus.clone();
        bus.clone().on_object_added(move |_| {
            bus.emit_history_changed(true, false);
        });
    }
    {
        let seen = seen.clone();
        bus.on_history_changed(move |can_undo, _| seen.set(can_undo));
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert!(seen.get());
}

#[test]
fn aggregate_change_collapses_a_burst_to_one_signal() {
    let bus = bus_with_debounce(Duration::from_millis(50));
    let fired = Rc::new(Cell::new(0));
    {
        let fired = fired.clone();
        bus.on_aggregate_change(move || fired.set(fired.get() + 1));
    }

    for _ in 0..5 {
        bus.publish(EditorEvent::ObjectModified { id: ObjectId::new() });
    }
    bus.pump(Instant::now());
    assert_eq!(fired.get(), 0, "must not fire inside the window");

    bus.pump(Instant::now() + Duration::from_millis(100));
    assert_eq!(fired.get(), 1);

    bus.pump(Instant::now() + Duration::from_millis(500));
    assert_eq!(fired.get(), 1, "one burst, one signal");
}

#[test]
fn lock_unlock_and_text_events_arm_the_debouncer() {
    for event in [
        EditorEvent::ObjectLocked { id: ObjectId::new() },
        EditorEvent::ObjectUnlocked { id: ObjectId::new() },
        EditorEvent::TextChanged { id: ObjectId::new() },
    ] {
        let bus = bus_with_debounce(Duration::from_millis(10));
        let fired = Rc::new(Cell::new(0));
        {
            let fired = fired.clone();
            bus.on_aggregate_change(move || fired.set(fired.get() + 1));
        }
        bus.publish(event);
        bus.pump(Instant::now() + Duration::from_millis(50));
        assert_eq!(fired.get(), 1);
    }
}

#[test]
fn non_mutation_events_do_not_arm_the_debouncer() {
    let bus = bus_with_debounce(Duration::from_millis(10));
    let fired = Rc::new(Cell::new(0));
    {
        let fired = fired.clone();
        bus.on_aggregate_change(move || fired.set(fired.get() + 1));
    }
    bus.publish(EditorEvent::SelectionChanged { selected: vec![] });
    bus.publish(EditorEvent::HistoryChanged {
        can_undo: true,
        can_redo: false,
    });
    bus.publish(EditorEvent::ZoomChanged { level: 2.0 });
    bus.publish(EditorEvent::PreRender);
    bus.pump(Instant::now() + Duration::from_secs(10));
    assert_eq!(fired.get(), 0);
}

#[test]
fn emit_helpers_carry_their_payloads() {
    let bus = bus();
    let zoom = Rc::new(Cell::new(0.0f32));
    let locked = Rc::new(RefCell::new(Vec::new()));
    {
        let zoom = zoom.clone();
        bus.on_zoom_changed(move |level| zoom.set(level));
    }
    {
        let locked = locked.clone();
        bus.on_object_locked(move |id| locked.borrow_mut().push(id));
    }
    let id = ObjectId::new();
    bus.emit_zoom_changed(2.5);
    bus.emit_object_locked(id);
    bus.emit_object_unlocked(id);
    assert_eq!(zoom.get(), 2.5);
    assert_eq!(*locked.borrow(), vec![id]);
}

#[test]
fn generic_subscribe_sees_the_whole_event() {
    let bus = bus();
    let seen = Rc::new(Cell::new(false));
    {
        let seen = seen.clone();
        bus.subscribe(
            EventChannel::HistoryChanged,
            Box::new(move |event| {
                if let EditorEvent::HistoryChanged { can_undo: true, .. } = event {
                    seen.set(true);
                }
            }),
        );
    }
    bus.emit_history_changed(true, true);
    assert!(seen.get());
}

#[test]
fn destroyed_bus_ignores_publishes_and_pumps() {
    let bus = bus_with_debounce(Duration::from_millis(10));
    let calls = Rc::new(Cell::new(0));
    {
        let calls = calls.clone();
        bus.on_object_added(move |_| calls.set(calls.get() + 1));
    }
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    assert_eq!(calls.get(), 1);

    bus.destroy();
    bus.publish(EditorEvent::ObjectAdded { id: ObjectId::new() });
    bus.pump(Instant::now() + Duration::from_secs(10));
    assert_eq!(calls.get(), 1);
}
