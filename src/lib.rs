#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod session;

pub use config::{EditorConfig, HistoryConfig, InputConfig, NotificationConfig};
pub use engine::{
    ObjectId, SceneEngine, SceneEvent, SceneEventSink, SceneSnapshot, ViewportTransform,
};
pub use error::{EngineError, Error, HistoryError};
pub use event::{EditorEvent, EventBus, EventCallback, EventChannel, SubscriptionHandle};
pub use history::{HistoryEngine, HistoryEntry};
pub use input::{
    DispatchOutcome, EditorCommand, EguiInputAdapter, InputDispatcher, InputEvent, MoveDirection,
    TouchPoint,
};
pub use session::EditorSession;
