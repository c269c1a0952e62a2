//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a graphics backend implements so scenes can
//! upload their vertex streams and textures, bind material state and issue draws
//! without knowing which API sits underneath.

use slotmap::new_key_type;
use thiserror::Error;

use crate::assets::ImageData;
use crate::render::Vertex;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

new_key_type! {
    /// Handle to a 2D texture stored in the backend
    pub struct TextureHandle;

    /// Handle to a vertex buffer stored in the backend
    pub struct VertexBufferHandle;
}

/// Texture unit the diffuse texture is bound to
pub const DIFFUSE_TEXTURE_UNIT: u32 = 0;

/// Uniform locations shared with the shaders
///
/// Material slots use the fixed locations 0-6 of the fragment shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    /// Diffuse color (vec3)
    DiffuseColor = 0,
    /// Ambient color (vec3)
    AmbientColor = 1,
    /// Specular color (vec3)
    SpecularColor = 2,
    /// Emissive color (vec3)
    EmissiveColor = 3,
    /// Transparency (float)
    Transparency = 4,
    /// Index of refraction (float)
    RefractionIndex = 5,
    /// Specular exponent (float)
    SpecularExponent = 6,
    /// Model matrix (mat4)
    Model = 16,
    /// View matrix (mat4)
    View = 17,
    /// Projection matrix (mat4)
    Projection = 18,
}

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A handle that was never created or has already been destroyed
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Resource could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Main rendering backend trait
///
/// Resources created through this trait are owned by the caller, which must
/// destroy each handle exactly once.
pub trait RenderBackend {
    /// Upload a triangle list into a new vertex buffer
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BackendResult<VertexBufferHandle>;

    /// Free a vertex buffer
    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> BackendResult<()>;

    /// Upload an image into a new 2D texture (repeat wrapping, nearest filtering, mipmapped)
    fn create_texture(&mut self, image: &ImageData) -> BackendResult<TextureHandle>;

    /// Free a texture
    fn destroy_texture(&mut self, texture: TextureHandle) -> BackendResult<()>;

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()>;

    /// Set a float uniform
    fn set_uniform_f32(&mut self, slot: UniformSlot, value: f32);

    /// Set a vec3 uniform
    fn set_uniform_vec3(&mut self, slot: UniformSlot, value: [f32; 3]);

    /// Set a column-major mat4 uniform
    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: [[f32; 4]; 4]);

    /// Clear color and depth
    fn clear(&mut self, color: [f32; 4]);

    /// Draw `vertex_count` vertices of `buffer` as a triangle list
    fn draw_triangles(&mut self, buffer: VertexBufferHandle, vertex_count: u32) -> BackendResult<()>;
}
