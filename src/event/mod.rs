mod bus;
mod debounce;

pub use bus::{EventBus, EventCallback, SubscriptionHandle};
pub use debounce::DebouncedSignal;

use crate::engine::{ObjectId, SceneEvent};

/// Domain events carried by the notification bus
#[derive(Debug, Clone)]
pub enum EditorEvent {
    ObjectAdded { id: ObjectId },
    ObjectRemoved { id: ObjectId },
    ObjectModified { id: ObjectId },
    ObjectLocked { id: ObjectId },
    ObjectUnlocked { id: ObjectId },
    SelectionChanged { selected: Vec<ObjectId> },
    HistoryChanged { can_undo: bool, can_redo: bool },
    ZoomChanged { level: f32 },
    PreRender,
    TextChanged { id: ObjectId },
    /// Signal-only event on the debounced aggregate-change channel
    AggregateChange,
}

/// One channel per event kind; subscriptions are per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    ObjectAdded,
    ObjectRemoved,
    ObjectModified,
    ObjectLocked,
    ObjectUnlocked,
    SelectionChanged,
    HistoryChanged,
    ZoomChanged,
    PreRender,
    TextChanged,
    AggregateChange,
}

impl EditorEvent {
    /// The channel this event is delivered on
    pub fn channel(&self) -> EventChannel {
        match self {
            EditorEvent::ObjectAdded { .. } => EventChannel::ObjectAdded,
            EditorEvent::ObjectRemoved { .. } => EventChannel::ObjectRemoved,
            EditorEvent::ObjectModified { .. } => EventChannel::ObjectModified,
            EditorEvent::ObjectLocked { .. } => EventChannel::ObjectLocked,
            EditorEvent::ObjectUnlocked { .. } => EventChannel::ObjectUnlocked,
            EditorEvent::SelectionChanged { .. } => EventChannel::SelectionChanged,
            EditorEvent::HistoryChanged { .. } => EventChannel::HistoryChanged,
            EditorEvent::ZoomChanged { .. } => EventChannel::ZoomChanged,
            EditorEvent::PreRender => EventChannel::PreRender,
            EditorEvent::TextChanged { .. } => EventChannel::TextChanged,
            EditorEvent::AggregateChange => EventChannel::AggregateChange,
        }
    }
}

impl From<SceneEvent> for EditorEvent {
    fn from(event: SceneEvent) -> Self {
        match event {
            SceneEvent::ObjectAdded(id) => EditorEvent::ObjectAdded { id },
            SceneEvent::ObjectRemoved(id) => EditorEvent::ObjectRemoved { id },
            SceneEvent::ObjectModified(id) => EditorEvent::ObjectModified { id },
            SceneEvent::TextChanged(id) => EditorEvent::TextChanged { id },
            SceneEvent::SelectionChanged(selected) => EditorEvent::SelectionChanged { selected },
            SceneEvent::PreRender => EditorEvent::PreRender,
        }
    }
}
