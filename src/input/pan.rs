use egui::{Pos2, Vec2};

use crate::engine::SceneEngine;
use crate::input::TouchPoint;

/// Per-source pan accumulation state.
///
/// Each panning source owns its own instance; all instances write to the one
/// shared viewport transform through [`apply`](Self::apply). The retained
/// `last_delta` exists only to support the accumulation math and is cleared
/// when the source's session ends.
#[derive(Debug, Default)]
pub struct PanSession {
    last_delta: Vec2,
}

impl PanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delta to the shared transform's translation and request a
    /// render. Silently does nothing while the engine has no transform yet.
    pub fn apply(&mut self, engine: &dyn SceneEngine, delta: Vec2) {
        let Some(mut transform) = engine.viewport_transform() else {
            return;
        };
        transform.translate(delta);
        engine.set_viewport_transform(transform);
        self.last_delta = delta;
        engine.request_render();
    }

    pub fn reset(&mut self) {
        self.last_delta = Vec2::ZERO;
    }

    pub fn last_delta(&self) -> Vec2 {
        self.last_delta
    }
}

/// Spacebar+drag panning: active while the space key and the primary pointer
/// are both held
#[derive(Debug, Default)]
pub struct SpacebarPan {
    session: PanSession,
    spacebar_held: bool,
    pointer_down: bool,
}

impl SpacebarPan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_space_down(&mut self) {
        self.spacebar_held = true;
    }

    pub fn on_space_up(&mut self) {
        self.spacebar_held = false;
        self.session.reset();
    }

    pub fn on_pointer_down(&mut self) {
        self.pointer_down = true;
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer_down = false;
        self.session.reset();
    }

    pub fn on_pointer_move(&mut self, engine: &dyn SceneEngine, movement: Vec2) {
        if self.spacebar_held && self.pointer_down {
            self.session.apply(engine, movement);
        }
    }

    pub fn is_panning(&self) -> bool {
        self.spacebar_held && self.pointer_down
    }
}

/// Wheel/trackpad panning: every wheel delta goes straight into the
/// translation
#[derive(Debug, Default)]
pub struct WheelPan {
    session: PanSession,
}

impl WheelPan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_wheel(&mut self, engine: &dyn SceneEngine, delta: Vec2) {
        self.session.apply(engine, delta);
    }
}

/// Two-finger touch panning over the gesture centroid.
///
/// Selection is parked for the duration of the gesture. A centroid delta
/// whose x or y magnitude exceeds `max_jump` is treated as sensor noise and
/// the whole update is dropped; the reference centroid still advances so one
/// spike suppresses exactly one update.
#[derive(Debug)]
pub struct TouchPan {
    session: PanSession,
    max_jump: f32,
    gesture_active: bool,
    last_centroid: Option<Pos2>,
}

impl TouchPan {
    pub fn new(max_jump: f32) -> Self {
        Self {
            session: PanSession::new(),
            max_jump,
            gesture_active: false,
            last_centroid: None,
        }
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture_active
    }

    pub fn on_touch_start(&mut self, engine: &dyn SceneEngine, touches: &[TouchPoint]) {
        if self.gesture_active || touches.len() != 2 {
            return;
        }
        self.gesture_active = true;
        self.last_centroid = Some(centroid(touches));
        engine.set_selection_enabled(false);
    }

    pub fn on_touch_move(&mut self, engine: &dyn SceneEngine, touches: &[TouchPoint]) {
        if !self.gesture_active || touches.len() != 2 {
            return;
        }
        let current = centroid(touches);
        let Some(previous) = self.last_centroid.replace(current) else {
            return;
        };
        let delta = current - previous;
        if engine.active_object().is_some() {
            return;
        }
        if delta.x.abs() > self.max_jump || delta.y.abs() > self.max_jump {
            log::debug!("touch pan delta ({}, {}) exceeds max jump, dropped", delta.x, delta.y);
            return;
        }
        self.session.apply(engine, delta);
    }

    pub fn on_touch_end(&mut self, engine: &dyn SceneEngine, remaining: &[TouchPoint]) {
        if self.gesture_active && remaining.len() < 2 {
            self.end(engine);
        }
    }

    /// Close the gesture session and give selection back
    pub fn end(&mut self, engine: &dyn SceneEngine) {
        if !self.gesture_active {
            return;
        }
        self.gesture_active = false;
        self.last_centroid = None;
        self.session.reset();
        engine.set_selection_enabled(true);
    }
}

fn centroid(touches: &[TouchPoint]) -> Pos2 {
    let sum = touches
        .iter()
        .fold(Vec2::ZERO, |acc, touch| acc + touch.position.to_vec2());
    (sum / touches.len() as f32).to_pos2()
}
