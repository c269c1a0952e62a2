//! Public rendering API
//!
//! The renderer talks to graphics hardware only through [`RenderBackend`].

pub mod render_backend;

pub use render_backend::{
    BackendResult, RenderBackend, RenderError, TextureHandle, UniformSlot, VertexBufferHandle,
    DIFFUSE_TEXTURE_UNIT,
};
