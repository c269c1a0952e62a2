//! # Rendering System
//!
//! Backend-agnostic rendering types: the interleaved vertex format, materials,
//! draw batches, the camera, and the [`RenderBackend`] trait that graphics
//! backends implement.

pub mod api;
pub mod backends;
pub mod batch;
pub mod camera;
pub mod material;
pub mod vertex;

pub use api::{
    BackendResult, RenderBackend, RenderError, TextureHandle, UniformSlot, VertexBufferHandle,
    DIFFUSE_TEXTURE_UNIT,
};
pub use backends::{BackendCommand, RecordingBackend};
pub use batch::{partition_by_transparency, DrawBatch};
pub use camera::{CameraInput, CameraState, FrameState};
pub use material::{Material, MaterialIndex, MaterialTable};
pub use vertex::Vertex;
