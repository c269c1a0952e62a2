//! Per-vertex data streamed to the GPU

use bytemuck::{Pod, Zeroable};

/// 3D vertex data structure for rendering
///
/// A fully resolved face corner. Vertices are never shared between triangles:
/// every triangle corner in a draw batch is its own copy.
///
/// # Memory Layout
/// `#[repr(C)]` keeps the 32-byte interleaved layout the vertex shader expects:
/// position at offset 0, normal at 12, texture coordinate at 24.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Normal vector, zero when the face corner has none
    pub normal: [f32; 3],

    /// Texture coordinates, zero when the face corner has none
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Byte stride between consecutive vertices
    pub const STRIDE: usize = std::mem::size_of::<Self>();
}
