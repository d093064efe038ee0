use std::cell::{Cell, RefCell};
use std::rc::Rc;

use egui::{Key, PointerButton, Vec2};
use futures::future::LocalBoxFuture;

use crate::config::InputConfig;
use crate::engine::{ObjectId, SceneEngine};
use crate::error::{Error, HistoryError};
use crate::input::keyboard::{self, EditorCommand, MoveDirection};
use crate::input::pan::{SpacebarPan, TouchPan, WheelPan};
use crate::input::{DispatchOutcome, InputEvent};

/// Offset applied to every pasted duplicate
const PASTE_OFFSET: Vec2 = Vec2 { x: 10.0, y: 10.0 };

/// Single-slot undo/redo intent callback; last registration wins
pub type HistoryCallback = Box<dyn Fn() -> LocalBoxFuture<'static, Result<(), HistoryError>>>;

/// Routes device events to keyboard commands and the three panning modes.
///
/// The keyboard surface and each pan mode toggle independently; enabling an
/// enabled mode or disabling a disabled one is a no-op, and disabling a mode
/// drops its whole session state so nothing leaks into a later re-enable.
pub struct InputDispatcher {
    engine: Rc<dyn SceneEngine>,
    config: InputConfig,
    keyboard_enabled: Cell<bool>,
    spacebar: RefCell<Option<SpacebarPan>>,
    wheel: RefCell<Option<WheelPan>>,
    touch: RefCell<Option<TouchPan>>,
    clipboard: RefCell<Vec<ObjectId>>,
    paste_in_flight: Rc<Cell<bool>>,
    undo_callback: RefCell<Option<HistoryCallback>>,
    redo_callback: RefCell<Option<HistoryCallback>>,
}

impl InputDispatcher {
    pub fn new(engine: Rc<dyn SceneEngine>, config: InputConfig) -> Self {
        Self {
            engine,
            config,
            keyboard_enabled: Cell::new(false),
            spacebar: RefCell::new(None),
            wheel: RefCell::new(None),
            touch: RefCell::new(None),
            clipboard: RefCell::new(Vec::new()),
            paste_in_flight: Rc::new(Cell::new(false)),
            undo_callback: RefCell::new(None),
            redo_callback: RefCell::new(None),
        }
    }

    /// Feed one device event through the dispatcher
    pub fn handle_event(&self, event: &InputEvent) -> DispatchOutcome {
        match event {
            InputEvent::KeyDown { key, modifiers } => {
                if *key == Key::Space {
                    if let Some(pan) = self.spacebar.borrow_mut().as_mut() {
                        pan.on_space_down();
                    }
                }
                if self.keyboard_enabled.get() {
                    if let Some(command) = keyboard::command_for(*key, *modifiers) {
                        return self.run_command(command);
                    }
                }
                DispatchOutcome::ignored()
            }
            InputEvent::KeyUp { key } => {
                if *key == Key::Space {
                    if let Some(pan) = self.spacebar.borrow_mut().as_mut() {
                        pan.on_space_up();
                    }
                }
                DispatchOutcome::ignored()
            }
            InputEvent::PointerDown { button, .. } => {
                if *button == PointerButton::Primary {
                    if let Some(pan) = self.spacebar.borrow_mut().as_mut() {
                        pan.on_pointer_down();
                    }
                }
                DispatchOutcome::ignored()
            }
            InputEvent::PointerUp { button, .. } => {
                if *button == PointerButton::Primary {
                    if let Some(pan) = self.spacebar.borrow_mut().as_mut() {
                        pan.on_pointer_up();
                    }
                }
                DispatchOutcome::ignored()
            }
            InputEvent::PointerMove { movement, .. } => {
                if let Some(pan) = self.spacebar.borrow_mut().as_mut() {
                    pan.on_pointer_move(&*self.engine, *movement);
                }
                DispatchOutcome::ignored()
            }
            InputEvent::Wheel { delta } => {
                let mut slot = self.wheel.borrow_mut();
                match slot.as_mut() {
                    Some(pan) => {
                        pan.on_wheel(&*self.engine, *delta);
                        // Keep the host page from scrolling under the canvas
                        DispatchOutcome::consumed()
                    }
                    None => DispatchOutcome::ignored(),
                }
            }
            InputEvent::TouchStart { touches } => {
                if let Some(pan) = self.touch.borrow_mut().as_mut() {
                    pan.on_touch_start(&*self.engine, touches);
                }
                DispatchOutcome::ignored()
            }
            InputEvent::TouchMove { touches } => {
                if let Some(pan) = self.touch.borrow_mut().as_mut() {
                    pan.on_touch_move(&*self.engine, touches);
                }
                DispatchOutcome::ignored()
            }
            InputEvent::TouchEnd { touches } => {
                if let Some(pan) = self.touch.borrow_mut().as_mut() {
                    pan.on_touch_end(&*self.engine, touches);
                }
                DispatchOutcome::ignored()
            }
        }
    }

    fn run_command(&self, command: EditorCommand) -> DispatchOutcome {
        match command {
            EditorCommand::Move(direction) => self.move_active(direction),
            EditorCommand::DeleteSelection => self.delete_selection(),
            EditorCommand::Copy => self.copy_selection(),
            EditorCommand::Paste => self.paste(),
            EditorCommand::Undo => self.run_history(&self.undo_callback, "undo"),
            EditorCommand::Redo => self.run_history(&self.redo_callback, "redo"),
        }
    }

    /// Nudge the active object one arrow-key step. The applied distance is
    /// divided by the zoom so the on-screen movement rate stays constant.
    fn move_active(&self, direction: MoveDirection) -> DispatchOutcome {
        let Some(id) = self.engine.active_object() else {
            return DispatchOutcome::ignored();
        };
        if self.engine.is_locked(id) {
            // Locked objects hold still; the key keeps its default behavior
            return DispatchOutcome::ignored();
        }
        let distance = self.config.arrow_key_distance / self.engine.zoom();
        self.engine.translate_object(id, direction.unit() * distance);
        self.engine.notify_object_modified(id);
        self.engine.request_render();
        DispatchOutcome::consumed()
    }

    fn delete_selection(&self) -> DispatchOutcome {
        let selected = self.engine.selected_objects();
        if selected.is_empty() {
            log::debug!("delete ignored: nothing selected");
            return DispatchOutcome::consumed();
        }
        for id in selected {
            self.engine.remove_object(id);
        }
        self.engine.clear_selection();
        self.engine.request_render();
        DispatchOutcome::consumed()
    }

    /// Replace the clipboard with the unlocked subset of the selection
    fn copy_selection(&self) -> DispatchOutcome {
        let unlocked: Vec<ObjectId> = self
            .engine
            .selected_objects()
            .into_iter()
            .filter(|id| !self.engine.is_locked(*id))
            .collect();
        if unlocked.is_empty() {
            log::debug!("copy ignored: no unlocked objects selected");
            return DispatchOutcome::consumed();
        }
        *self.clipboard.borrow_mut() = unlocked;
        DispatchOutcome::consumed()
    }

    /// Duplicate every buffered object at a fixed offset. The render request
    /// is issued once, after the last clone resolves.
    fn paste(&self) -> DispatchOutcome {
        let buffer = self.clipboard.borrow().clone();
        if buffer.is_empty() {
            log::debug!("paste ignored: clipboard empty");
            return DispatchOutcome::consumed();
        }
        if self.paste_in_flight.get() {
            log::warn!("paste rejected: a previous paste has not finished");
            return DispatchOutcome::consumed();
        }
        self.paste_in_flight.set(true);
        let engine = self.engine.clone();
        let in_flight = self.paste_in_flight.clone();
        DispatchOutcome::deferred(Box::pin(async move {
            let mut result = Ok(());
            for id in buffer {
                if let Err(err) = engine.clone_object(id, PASTE_OFFSET).await {
                    result = Err(Error::from(err));
                    break;
                }
            }
            if result.is_ok() {
                engine.request_render();
            }
            in_flight.set(false);
            result
        }))
    }

    /// Invoke the registered undo/redo callback. Empty-stack outcomes are
    /// benign; an engine failure during the restore propagates.
    fn run_history(
        &self,
        slot: &RefCell<Option<HistoryCallback>>,
        kind: &'static str,
    ) -> DispatchOutcome {
        let future = match &*slot.borrow() {
            Some(callback) => callback(),
            None => {
                log::debug!("{kind} ignored: no callback registered");
                return DispatchOutcome::consumed();
            }
        };
        DispatchOutcome::deferred(Box::pin(async move {
            match future.await {
                Err(HistoryError::NothingToUndo | HistoryError::NothingToRedo) => {
                    log::debug!("{kind}: nothing to do");
                    Ok(())
                }
                Err(HistoryError::RestoreInFlight) => {
                    log::warn!("{kind} rejected: a restore is already in flight");
                    Ok(())
                }
                other => other.map_err(Error::from),
            }
        }))
    }

    pub fn enable_keyboard(&self) {
        self.keyboard_enabled.set(true);
    }

    pub fn disable_keyboard(&self) {
        self.keyboard_enabled.set(false);
    }

    pub fn is_keyboard_enabled(&self) -> bool {
        self.keyboard_enabled.get()
    }

    pub fn enable_spacebar_pan(&self) {
        let mut slot = self.spacebar.borrow_mut();
        if slot.is_none() {
            *slot = Some(SpacebarPan::new());
        }
    }

    pub fn disable_spacebar_pan(&self) {
        self.spacebar.borrow_mut().take();
    }

    pub fn is_spacebar_pan_enabled(&self) -> bool {
        self.spacebar.borrow().is_some()
    }

    pub fn enable_wheel_pan(&self) {
        let mut slot = self.wheel.borrow_mut();
        if slot.is_none() {
            *slot = Some(WheelPan::new());
        }
    }

    pub fn disable_wheel_pan(&self) {
        self.wheel.borrow_mut().take();
    }

    pub fn is_wheel_pan_enabled(&self) -> bool {
        self.wheel.borrow().is_some()
    }

    pub fn enable_touch_pan(&self) {
        let mut slot = self.touch.borrow_mut();
        if slot.is_none() {
            *slot = Some(TouchPan::new(self.config.touch_pan_max_jump));
        }
    }

    /// Disable touch panning; if a gesture is mid-flight, selection is given
    /// back before the session state is dropped
    pub fn disable_touch_pan(&self) {
        if let Some(mut pan) = self.touch.borrow_mut().take() {
            pan.end(&*self.engine);
        }
    }

    pub fn is_touch_pan_enabled(&self) -> bool {
        self.touch.borrow().is_some()
    }

    /// Register the undo intent callback; a later registration replaces it
    pub fn on_undo<F>(&self, callback: F)
    where
        F: Fn() -> LocalBoxFuture<'static, Result<(), HistoryError>> + 'static,
    {
        *self.undo_callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Register the redo intent callback; a later registration replaces it
    pub fn on_redo<F>(&self, callback: F)
    where
        F: Fn() -> LocalBoxFuture<'static, Result<(), HistoryError>> + 'static,
    {
        *self.redo_callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Current clipboard contents, most recently copied first-to-last
    pub fn clipboard(&self) -> Vec<ObjectId> {
        self.clipboard.borrow().clone()
    }

    /// Disable every input surface and drop clipboard and callback slots
    pub fn destroy(&self) {
        self.disable_keyboard();
        self.disable_spacebar_pan();
        self.disable_wheel_pan();
        self.disable_touch_pan();
        self.clipboard.borrow_mut().clear();
        self.undo_callback.borrow_mut().take();
        self.redo_callback.borrow_mut().take();
    }
}
