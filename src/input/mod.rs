use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};
use futures::future::LocalBoxFuture;

mod adapter;
mod dispatcher;
mod keyboard;
mod pan;

pub use adapter::EguiInputAdapter;
pub use dispatcher::{HistoryCallback, InputDispatcher};
pub use keyboard::{EditorCommand, MoveDirection};

use crate::error::Error;

/// A single touch contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Pos2,
}

/// Device events fed to the dispatcher by the host platform
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key was pressed
    KeyDown { key: Key, modifiers: Modifiers },
    /// Key was released
    KeyUp { key: Key },
    /// Mouse button was pressed
    PointerDown { position: Pos2, button: PointerButton },
    /// Mouse button was released
    PointerUp { position: Pos2, button: PointerButton },
    /// Pointer moved; `movement` is the delta since the previous move
    PointerMove { position: Pos2, movement: Vec2 },
    /// Wheel or trackpad scroll
    Wheel { delta: Vec2 },
    /// Touch contacts appeared; `touches` is every live contact
    TouchStart { touches: Vec<TouchPoint> },
    /// Touch contacts moved
    TouchMove { touches: Vec<TouchPoint> },
    /// Touch contacts lifted; `touches` is the contacts that remain
    TouchEnd { touches: Vec<TouchPoint> },
}

/// Asynchronous tail of a dispatched command, driven by the host
pub type DeferredOp = LocalBoxFuture<'static, Result<(), Error>>;

/// What the dispatcher did with an input event.
///
/// `prevent_default` asks the host to suppress its default reaction to the
/// event; `deferred` carries the suspending part of paste/undo/redo.
pub struct DispatchOutcome {
    pub prevent_default: bool,
    pub deferred: Option<DeferredOp>,
}

impl DispatchOutcome {
    /// Event not handled; the host keeps its default behavior
    pub fn ignored() -> Self {
        Self {
            prevent_default: false,
            deferred: None,
        }
    }

    /// Event consumed synchronously
    pub fn consumed() -> Self {
        Self {
            prevent_default: true,
            deferred: None,
        }
    }

    /// Event consumed with a suspending tail still to run
    pub fn deferred(op: DeferredOp) -> Self {
        Self {
            prevent_default: true,
            deferred: Some(op),
        }
    }
}

impl std::fmt::Debug for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchOutcome")
            .field("prevent_default", &self.prevent_default)
            .field("deferred", &self.deferred.is_some())
            .finish()
    }
}
