use std::fmt;
use std::rc::Rc;

use egui::{Pos2, Vec2};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;

/// Opaque handle to an object living in the external scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Serialized copy of the scene's object graph.
///
/// Opaque to this crate; produced and consumed by the engine. The viewport
/// transform is never part of a snapshot, so restoring one never moves the
/// camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot(pub serde_json::Value);

/// The 6-component affine matrix `[a, b, c, d, e, f]` mapping scene
/// coordinates to screen coordinates: `(e, f)` is the translation and
/// `(a, d)` the scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform(pub [f32; 6]);

impl ViewportTransform {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// The translation components `(e, f)`
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.0[4], self.0[5])
    }

    /// Shift the translation components in place
    pub fn translate(&mut self, delta: Vec2) {
        self.0[4] += delta.x;
        self.0[5] += delta.y;
    }

    /// The horizontal scale factor `a`, which doubles as the zoom level for
    /// skew-free transforms
    pub fn zoom(&self) -> f32 {
        self.0[0]
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Raw mutation notifications flowing out of the engine
#[derive(Debug, Clone)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectModified(ObjectId),
    TextChanged(ObjectId),
    SelectionChanged(Vec<ObjectId>),
    PreRender,
}

/// Outlet the composition root installs to receive [`SceneEvent`]s
pub type SceneEventSink = Rc<dyn Fn(SceneEvent)>;

/// Contract of the external rendering engine this crate coordinates.
///
/// The model is single-threaded and cooperative: implementors are shared as
/// `Rc<dyn SceneEngine>` and use interior mutability. Synchronous mutators are
/// silent no-ops when a handle is stale or the viewport transform does not
/// exist yet; only the asynchronous primitives (`load_scene`, `clone_object`)
/// can fail, and their failures propagate untouched.
pub trait SceneEngine {
    /// Current viewport transform, or `None` before the engine has one
    fn viewport_transform(&self) -> Option<ViewportTransform>;

    fn set_viewport_transform(&self, transform: ViewportTransform);

    /// Current zoom level; 1.0 while no transform exists
    fn zoom(&self) -> f32;

    /// The single object keyboard commands act on, if any
    fn active_object(&self) -> Option<ObjectId>;

    /// Every selected object, with multi-selections already expanded into
    /// their members
    fn selected_objects(&self) -> Vec<ObjectId>;

    fn clear_selection(&self);

    /// Toggle whether the user can select objects at all; used to park
    /// selection during a two-finger pan
    fn set_selection_enabled(&self, enabled: bool);

    fn is_locked(&self, id: ObjectId) -> bool;

    fn object_position(&self, id: ObjectId) -> Option<Pos2>;

    /// Move an object and recompute its cached coordinates
    fn translate_object(&self, id: ObjectId, delta: Vec2);

    fn remove_object(&self, id: ObjectId);

    /// Fire a synthetic object-modified notification after a programmatic
    /// property change
    fn notify_object_modified(&self, id: ObjectId);

    /// Ask for a deferred, coalescing redraw
    fn request_render(&self);

    /// Force an immediate redraw
    fn render_now(&self);

    /// Serialize the scene's object graph, excluding the viewport transform
    fn serialize_scene(&self) -> SceneSnapshot;

    /// Replace the scene contents from a snapshot. Suspending operation.
    fn load_scene(&self, snapshot: &SceneSnapshot) -> LocalBoxFuture<'_, EngineResult<()>>;

    /// Duplicate an object at `offset` from the original and add the copy to
    /// the scene. Suspending operation; resolves to the new object's handle.
    fn clone_object(&self, id: ObjectId, offset: Vec2) -> LocalBoxFuture<'_, EngineResult<ObjectId>>;

    /// Install (or remove) the observer that receives mutation notifications
    fn set_event_sink(&self, sink: Option<SceneEventSink>);
}
