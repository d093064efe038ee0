use std::rc::Rc;
use std::time::Instant;

use crate::config::EditorConfig;
use crate::engine::SceneEngine;
use crate::event::{EditorEvent, EventBus};
use crate::history::HistoryEngine;
use crate::input::{DispatchOutcome, InputDispatcher, InputEvent};

/// Composition root tying the engine, bus, history and input together.
///
/// Construction order is bus, engine sink, history, input; the dispatcher's
/// undo/redo intents are wired straight to the history engine. Keyboard and
/// all three pan modes start enabled. [`destroy`](Self::destroy) tears the
/// pieces down in reverse order.
pub struct EditorSession {
    engine: Rc<dyn SceneEngine>,
    bus: Rc<EventBus>,
    history: Rc<HistoryEngine>,
    input: Rc<InputDispatcher>,
}

impl EditorSession {
    pub fn new(engine: Rc<dyn SceneEngine>, config: EditorConfig) -> Self {
        let bus = Rc::new(EventBus::new(config.notifications));

        // Engine mutation notifications feed the bus
        {
            let bus = bus.clone();
            engine.set_event_sink(Some(Rc::new(move |event| {
                bus.publish(EditorEvent::from(event));
            })));
        }

        let history = Rc::new(HistoryEngine::new(
            engine.clone(),
            bus.clone(),
            config.history,
        ));
        history.initialize();

        let input = Rc::new(InputDispatcher::new(engine.clone(), config.input));
        input.enable_keyboard();
        input.enable_spacebar_pan();
        input.enable_wheel_pan();
        input.enable_touch_pan();

        {
            let history = history.clone();
            input.on_undo(move || {
                let history = history.clone();
                Box::pin(async move { history.undo().await })
            });
        }
        {
            let history = history.clone();
            input.on_redo(move || {
                let history = history.clone();
                Box::pin(async move { history.redo().await })
            });
        }

        Self {
            engine,
            bus,
            history,
            input,
        }
    }

    /// Feed one device event through the input dispatcher
    pub fn handle_input(&self, event: &InputEvent) -> DispatchOutcome {
        self.input.handle_event(event)
    }

    /// Advance time-driven work (the aggregate-change debouncer). Call once
    /// per host tick or frame.
    pub fn tick(&self, now: Instant) {
        self.bus.pump(now);
    }

    pub fn engine(&self) -> &Rc<dyn SceneEngine> {
        &self.engine
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn history(&self) -> &Rc<HistoryEngine> {
        &self.history
    }

    pub fn input(&self) -> &Rc<InputDispatcher> {
        &self.input
    }

    /// Tear down: input first, then history, then the engine sink and bus
    pub fn destroy(&self) {
        self.input.destroy();
        self.history.destroy();
        self.engine.set_event_sink(None);
        self.bus.destroy();
    }
}
