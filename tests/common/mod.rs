#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::Poll;

use easel::{
    EngineError, ObjectId, SceneEngine, SceneEvent, SceneEventSink, SceneSnapshot,
    ViewportTransform,
};
use egui::{Pos2, Vec2};
use futures::future::LocalBoxFuture;
use serde_json::json;

/// One object in the mock scene
#[derive(Debug, Clone)]
pub struct MockObject {
    pub id: ObjectId,
    pub left: f32,
    pub top: f32,
    pub locked: bool,
}

struct MockState {
    objects: Vec<MockObject>,
    selection: Vec<ObjectId>,
    selection_enabled: bool,
    viewport: Option<ViewportTransform>,
    render_requests: usize,
    renders: usize,
    fail_loads: bool,
    fail_clones: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            selection: Vec::new(),
            selection_enabled: true,
            viewport: Some(ViewportTransform::IDENTITY),
            render_requests: 0,
            renders: 0,
            fail_loads: false,
            fail_clones: false,
        }
    }
}

/// In-memory stand-in for the external rendering engine.
///
/// Mirrors the collaborator contract closely enough for the interaction
/// tests: objects are flat records, snapshots are JSON of the object list
/// (never the viewport), and `load_scene` re-fires `ObjectAdded` for every
/// loaded object the way a real deserializing engine would.
#[derive(Default)]
pub struct MockEngine {
    state: RefCell<MockState>,
    sink: RefCell<Option<SceneEventSink>>,
    stall_loads: Rc<Cell<bool>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&self, left: f32, top: f32) -> ObjectId {
        let id = ObjectId::new();
        self.state.borrow_mut().objects.push(MockObject {
            id,
            left,
            top,
            locked: false,
        });
        self.emit(SceneEvent::ObjectAdded(id));
        id
    }

    pub fn add_locked_object(&self, left: f32, top: f32) -> ObjectId {
        let id = self.add_object(left, top);
        if let Some(object) = self
            .state
            .borrow_mut()
            .objects
            .iter_mut()
            .find(|o| o.id == id)
        {
            object.locked = true;
        }
        id
    }

    /// A genuine user-visible mutation: shifts the object and notifies
    pub fn modify_object(&self, id: ObjectId) {
        if let Some(object) = self
            .state
            .borrow_mut()
            .objects
            .iter_mut()
            .find(|o| o.id == id)
        {
            object.left += 1.0;
        }
        self.emit(SceneEvent::ObjectModified(id));
    }

    pub fn select(&self, ids: &[ObjectId]) {
        self.state.borrow_mut().selection = ids.to_vec();
        self.emit(SceneEvent::SelectionChanged(ids.to_vec()));
    }

    pub fn set_zoom_level(&self, zoom: f32) {
        let mut state = self.state.borrow_mut();
        let mut transform = state.viewport.unwrap_or_default();
        transform.0[0] = zoom;
        transform.0[3] = zoom;
        state.viewport = Some(transform);
    }

    /// Simulate an engine that has not built its transform yet
    pub fn drop_viewport(&self) {
        self.state.borrow_mut().viewport = None;
    }

    pub fn object(&self, id: ObjectId) -> Option<MockObject> {
        self.state.borrow().objects.iter().find(|o| o.id == id).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn objects(&self) -> Vec<MockObject> {
        self.state.borrow().objects.clone()
    }

    pub fn render_requests(&self) -> usize {
        self.state.borrow().render_requests
    }

    pub fn selection_enabled(&self) -> bool {
        self.state.borrow().selection_enabled
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.state.borrow_mut().fail_loads = fail;
    }

    /// While set, `load_scene` futures stay pending; used to exercise the
    /// in-flight restore guard
    pub fn set_stall_loads(&self, stall: bool) {
        self.stall_loads.set(stall);
    }

    pub fn set_fail_clones(&self, fail: bool) {
        self.state.borrow_mut().fail_clones = fail;
    }

    fn emit(&self, event: SceneEvent) {
        let sink = self.sink.borrow().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }
}

impl SceneEngine for MockEngine {
    fn viewport_transform(&self) -> Option<ViewportTransform> {
        self.state.borrow().viewport
    }

    fn set_viewport_transform(&self, transform: ViewportTransform) {
        self.state.borrow_mut().viewport = Some(transform);
    }

    fn zoom(&self) -> f32 {
        self.state
            .borrow()
            .viewport
            .map(|t| t.zoom())
            .unwrap_or(1.0)
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.state.borrow().selection.first().copied()
    }

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.state.borrow().selection.clone()
    }

    fn clear_selection(&self) {
        self.state.borrow_mut().selection.clear();
    }

    fn set_selection_enabled(&self, enabled: bool) {
        self.state.borrow_mut().selection_enabled = enabled;
    }

    fn is_locked(&self, id: ObjectId) -> bool {
        self.state
            .borrow()
            .objects
            .iter()
            .find(|o| o.id == id)
            .is_some_and(|o| o.locked)
    }

    fn object_position(&self, id: ObjectId) -> Option<Pos2> {
        self.state
            .borrow()
            .objects
            .iter()
            .find(|o| o.id == id)
            .map(|o| Pos2::new(o.left, o.top))
    }

    fn translate_object(&self, id: ObjectId, delta: Vec2) {
        if let Some(object) = self
            .state
            .borrow_mut()
            .objects
            .iter_mut()
            .find(|o| o.id == id)
        {
            object.left += delta.x;
            object.top += delta.y;
        }
    }

    fn remove_object(&self, id: ObjectId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.objects.len();
            state.objects.retain(|o| o.id != id);
            state.objects.len() != before
        };
        if removed {
            self.emit(SceneEvent::ObjectRemoved(id));
        }
    }

    fn notify_object_modified(&self, id: ObjectId) {
        self.emit(SceneEvent::ObjectModified(id));
    }

    fn request_render(&self) {
        self.state.borrow_mut().render_requests += 1;
    }

    fn render_now(&self) {
        self.state.borrow_mut().renders += 1;
    }

    fn serialize_scene(&self) -> SceneSnapshot {
        let objects: Vec<serde_json::Value> = self
            .state
            .borrow()
            .objects
            .iter()
            .map(|o| {
                json!({
                    "id": o.id,
                    "left": o.left,
                    "top": o.top,
                    "locked": o.locked,
                })
            })
            .collect();
        SceneSnapshot(json!({ "objects": objects }))
    }

    fn load_scene(&self, snapshot: &SceneSnapshot) -> LocalBoxFuture<'_, Result<(), EngineError>> {
        let snapshot = snapshot.clone();
        let stall = self.stall_loads.clone();
        Box::pin(async move {
            futures::future::poll_fn(|_| {
                if stall.get() {
                    Poll::Pending
                } else {
                    Poll::Ready(())
                }
            })
            .await;
            if self.state.borrow().fail_loads {
                return Err(EngineError::Deserialize("mock load failure".into()));
            }
            let values = snapshot
                .0
                .get("objects")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let mut objects = Vec::new();
            for value in values {
                let id: ObjectId = serde_json::from_value(value["id"].clone())
                    .map_err(|e| EngineError::Deserialize(e.to_string()))?;
                objects.push(MockObject {
                    id,
                    left: value["left"].as_f64().unwrap_or(0.0) as f32,
                    top: value["top"].as_f64().unwrap_or(0.0) as f32,
                    locked: value["locked"].as_bool().unwrap_or(false),
                });
            }
            let ids: Vec<ObjectId> = objects.iter().map(|o| o.id).collect();
            {
                let mut state = self.state.borrow_mut();
                state.objects = objects;
                state.selection.clear();
            }
            // A deserializing engine raises added-events for everything it
            // rebuilds; the history engine must not record those.
            for id in ids {
                self.emit(SceneEvent::ObjectAdded(id));
            }
            Ok(())
        })
    }

    fn clone_object(
        &self,
        id: ObjectId,
        offset: Vec2,
    ) -> LocalBoxFuture<'_, Result<ObjectId, EngineError>> {
        Box::pin(async move {
            if self.state.borrow().fail_clones {
                return Err(EngineError::CloneFailed("mock clone failure".into()));
            }
            let source = self
                .state
                .borrow()
                .objects
                .iter()
                .find(|o| o.id == id)
                .cloned();
            let Some(source) = source else {
                return Err(EngineError::ObjectNotFound(id));
            };
            let copy = MockObject {
                id: ObjectId::new(),
                left: source.left + offset.x,
                top: source.top + offset.y,
                locked: source.locked,
            };
            let copy_id = copy.id;
            self.state.borrow_mut().objects.push(copy);
            self.emit(SceneEvent::ObjectAdded(copy_id));
            Ok(copy_id)
        })
    }

    fn set_event_sink(&self, sink: Option<SceneEventSink>) {
        *self.sink.borrow_mut() = sink;
    }
}
