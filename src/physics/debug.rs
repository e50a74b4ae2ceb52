//! Optional debug-wireframe sink.
//!
//! The sync layer only decides *when* a wireframe appears and *where* it
//! sits; how it is drawn belongs to the embedding renderer.

use crate::utils::math::Transform;

use super::body::BodyId;
use super::shape::Shape;

/// Receiver for wireframe-like renderables keyed to a body's shapes.
pub trait DebugSink {
    /// A body entered the world; shapes describe its collision volumes.
    fn attach(&mut self, body: BodyId, shapes: &[Shape]);

    /// The body's world transform changed (called after each sync).
    fn update(&mut self, body: BodyId, transform: Transform);

    /// The body left the world or was destroyed.
    fn detach(&mut self, body: BodyId);
}

/// Sink that ignores everything, for hosts without debug rendering.
pub struct NullDebugSink;

impl DebugSink for NullDebugSink {
    fn attach(&mut self, _body: BodyId, _shapes: &[Shape]) {}
    fn update(&mut self, _body: BodyId, _transform: Transform) {}
    fn detach(&mut self, _body: BodyId) {}
}
