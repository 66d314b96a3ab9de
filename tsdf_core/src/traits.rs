//! Output abstraction for the triangulator.
//!
//! The triangulator only appends; it never reads back positions or reorders
//! what is already stored. Any growable vertex/triangle store can receive its
//! output by implementing [`MeshBuffer`].

use crate::types::{Point3, VertexId};

/// An append-only indexed triangle store.
pub trait MeshBuffer {
    /// Number of vertices stored so far.
    ///
    /// The id of the next pushed vertex equals this value.
    fn num_vertices(&self) -> usize;

    /// Append a vertex position.
    fn push_vertex(&mut self, vertex: Point3);

    /// Append a triangle referencing three previously pushed vertices.
    fn push_triangle(&mut self, triangle: [VertexId; 3]);
}
