use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::config::HistoryConfig;
use crate::engine::{SceneEngine, SceneSnapshot};
use crate::error::{EngineResult, HistoryError, HistoryResult};
use crate::event::{EventBus, EventChannel, SubscriptionHandle};

/// One recorded scene state. Immutable once captured.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: SceneSnapshot,
    pub timestamp: Instant,
}

/// Restore state of the engine. Mutation notifications only trigger an
/// auto-save in `Idle`; the other two states also reject a second restore
/// started while one is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestoreState {
    Idle,
    Undoing,
    Redoing,
}

#[derive(Default)]
struct Stacks {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

/// Snapshot-based undo/redo over the live scene.
///
/// The undo stack always holds the current state as its top entry plus the
/// states before it, so undo requires at least two entries. Snapshots never
/// include the viewport transform, and restores reapply the live transform
/// afterwards, so the camera stays put across undo/redo.
pub struct HistoryEngine {
    engine: Rc<dyn SceneEngine>,
    bus: Rc<EventBus>,
    config: HistoryConfig,
    stacks: RefCell<Stacks>,
    state: Cell<RestoreState>,
    tracking: Cell<bool>,
    subscriptions: RefCell<Vec<SubscriptionHandle>>,
}

impl HistoryEngine {
    pub fn new(engine: Rc<dyn SceneEngine>, bus: Rc<EventBus>, config: HistoryConfig) -> Self {
        Self {
            engine,
            bus,
            config,
            stacks: RefCell::new(Stacks::default()),
            state: Cell::new(RestoreState::Idle),
            tracking: Cell::new(true),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Seed the baseline snapshot and start listening for scene mutations
    pub fn initialize(self: &Rc<Self>) {
        let baseline = self.capture();
        self.stacks.borrow_mut().undo.push(baseline);

        let mutation_channels = [
            EventChannel::ObjectAdded,
            EventChannel::ObjectRemoved,
            EventChannel::ObjectModified,
        ];
        let mut subscriptions = self.subscriptions.borrow_mut();
        for channel in mutation_channels {
            let weak = Rc::downgrade(self);
            subscriptions.push(self.bus.subscribe(
                channel,
                Box::new(move |_| {
                    if let Some(history) = weak.upgrade() {
                        history.on_mutation();
                    }
                }),
            ));
        }
    }

    /// Mutation notification from the bus. Ignored while a restore is in
    /// flight (the restore itself raises mutation events) or while tracking
    /// is disabled.
    fn on_mutation(&self) {
        if self.state.get() != RestoreState::Idle || !self.tracking.get() {
            return;
        }
        self.save_state();
    }

    /// Record the current scene state, invalidating any redo history
    pub fn save_state(&self) {
        let entry = self.capture();
        {
            let mut stacks = self.stacks.borrow_mut();
            stacks.redo.clear();
            stacks.undo.push(entry);
            if stacks.undo.len() > self.config.max_size {
                stacks.undo.remove(0);
            }
        }
        self.emit_changed();
    }

    /// Restore the state before the current one.
    ///
    /// Rejects with [`HistoryError::RestoreInFlight`] while a previous
    /// restore is still pending, and [`HistoryError::NothingToUndo`] when no
    /// prior state exists. Engine failures propagate without retry.
    pub async fn undo(&self) -> HistoryResult {
        if self.state.get() != RestoreState::Idle {
            return Err(HistoryError::RestoreInFlight);
        }
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.state.set(RestoreState::Undoing);

        let current = self.capture();
        let target = {
            let mut stacks = self.stacks.borrow_mut();
            stacks.redo.push(current);
            stacks.undo.pop(); // discard the entry for the state being left
            stacks.undo.last().cloned()
        };
        let Some(target) = target else {
            self.state.set(RestoreState::Idle);
            return Err(HistoryError::NothingToUndo);
        };

        let result = self.restore(&target.snapshot).await;
        self.state.set(RestoreState::Idle);
        result?;
        self.emit_changed();
        Ok(())
    }

    /// Restore the most recently undone state
    pub async fn redo(&self) -> HistoryResult {
        if self.state.get() != RestoreState::Idle {
            return Err(HistoryError::RestoreInFlight);
        }
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.state.set(RestoreState::Redoing);

        let current = self.capture();
        let target = {
            let mut stacks = self.stacks.borrow_mut();
            let target = stacks.redo.pop();
            stacks.undo.push(current);
            if stacks.undo.len() > self.config.max_size {
                stacks.undo.remove(0);
            }
            target
        };
        let Some(target) = target else {
            self.state.set(RestoreState::Idle);
            return Err(HistoryError::NothingToRedo);
        };

        let result = self.restore(&target.snapshot).await;
        self.state.set(RestoreState::Idle);
        result?;
        self.emit_changed();
        Ok(())
    }

    /// Load a snapshot while keeping the camera where it is
    async fn restore(&self, snapshot: &SceneSnapshot) -> EngineResult<()> {
        let viewport = self.engine.viewport_transform();
        self.engine.load_scene(snapshot).await?;
        if let Some(viewport) = viewport {
            self.engine.set_viewport_transform(viewport);
        }
        self.engine.request_render();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.stacks.borrow().undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.stacks.borrow().redo.is_empty()
    }

    pub fn undo_stack_size(&self) -> usize {
        self.stacks.borrow().undo.len()
    }

    pub fn redo_stack_size(&self) -> usize {
        self.stacks.borrow().redo.len()
    }

    /// Empty both stacks and reseed a fresh baseline
    pub fn clear_history(&self) {
        {
            let mut stacks = self.stacks.borrow_mut();
            stacks.undo.clear();
            stacks.redo.clear();
        }
        let baseline = self.capture();
        self.stacks.borrow_mut().undo.push(baseline);
        self.emit_changed();
    }

    /// Resume recording mutation notifications
    pub fn enable(&self) {
        self.tracking.set(true);
    }

    /// Stop recording mutation notifications; undo/redo stay available
    pub fn disable(&self) {
        self.tracking.set(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.tracking.get()
    }

    /// Stop tracking, drop the subscriptions and empty both stacks
    pub fn destroy(&self) {
        for handle in self.subscriptions.borrow_mut().drain(..) {
            self.bus.unsubscribe(handle);
        }
        self.tracking.set(false);
        {
            let mut stacks = self.stacks.borrow_mut();
            stacks.undo.clear();
            stacks.redo.clear();
        }
        self.emit_changed();
    }

    fn capture(&self) -> HistoryEntry {
        HistoryEntry {
            snapshot: self.engine.serialize_scene(),
            timestamp: Instant::now(),
        }
    }

    fn emit_changed(&self) {
        self.bus
            .emit_history_changed(self.can_undo(), self.can_redo());
    }
}
