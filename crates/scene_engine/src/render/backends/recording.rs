//! In-memory backend that records every call
//!
//! Used for headless runs and to check what a scene asks the GPU to do.
//! Resources live in slot maps, so a stale or double-freed handle is reported
//! as [`RenderError::InvalidHandle`].

use slotmap::SlotMap;

use crate::assets::{ImageData, PixelFormat};
use crate::render::api::{BackendResult, RenderBackend, RenderError, TextureHandle, UniformSlot, VertexBufferHandle};
use crate::render::Vertex;

/// Texture metadata kept by the recording backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Sample layout
    pub format: PixelFormat,
}

/// A state change or draw issued to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Framebuffer clear
    Clear([f32; 4]),
    /// Texture bound to a unit
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Bound texture
        texture: TextureHandle,
    },
    /// Float uniform set
    UniformF32(UniformSlot, f32),
    /// Vec3 uniform set
    UniformVec3(UniformSlot, [f32; 3]),
    /// Mat4 uniform set
    UniformMat4(UniformSlot, [[f32; 4]; 4]),
    /// Triangle list drawn
    Draw {
        /// Source buffer
        buffer: VertexBufferHandle,
        /// Vertices drawn
        vertex_count: u32,
    },
}

/// Backend that keeps resources in memory and logs commands instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    textures: SlotMap<TextureHandle, TextureInfo>,
    buffers: SlotMap<VertexBufferHandle, Vec<Vertex>>,
    commands: Vec<BackendCommand>,
}

impl RecordingBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued so far
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Drain the command log, e.g. at the end of a frame
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of textures currently alive
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of vertex buffers currently alive
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Metadata of a live texture
    pub fn texture(&self, texture: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(texture)
    }

    /// Contents of a live vertex buffer
    pub fn buffer(&self, buffer: VertexBufferHandle) -> Option<&[Vertex]> {
        self.buffers.get(buffer).map(Vec::as_slice)
    }
}

impl RenderBackend for RecordingBackend {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BackendResult<VertexBufferHandle> {
        Ok(self.buffers.insert(vertices.to_vec()))
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> BackendResult<()> {
        self.buffers
            .remove(buffer)
            .map(|_| ())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{buffer:?}")))
    }

    fn create_texture(&mut self, image: &ImageData) -> BackendResult<TextureHandle> {
        let expected = (image.width as usize)
            .checked_mul(image.height as usize)
            .and_then(|pixels| pixels.checked_mul(image.format().bytes_per_pixel()))
            .unwrap_or(usize::MAX);
        if image.width == 0 || image.height == 0 || image.data.len() < expected {
            return Err(RenderError::ResourceCreation(format!(
                "{}x{} image with {} bytes",
                image.width,
                image.height,
                image.data.len()
            )));
        }
        Ok(self.textures.insert(TextureInfo {
            width: image.width,
            height: image.height,
            format: image.format(),
        }))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> BackendResult<()> {
        self.textures
            .remove(texture)
            .map(|_| ())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{texture:?}")))
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()> {
        if !self.textures.contains_key(texture) {
            return Err(RenderError::InvalidHandle(format!("{texture:?}")));
        }
        self.commands.push(BackendCommand::BindTexture { unit, texture });
        Ok(())
    }

    fn set_uniform_f32(&mut self, slot: UniformSlot, value: f32) {
        self.commands.push(BackendCommand::UniformF32(slot, value));
    }

    fn set_uniform_vec3(&mut self, slot: UniformSlot, value: [f32; 3]) {
        self.commands.push(BackendCommand::UniformVec3(slot, value));
    }

    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: [[f32; 4]; 4]) {
        self.commands.push(BackendCommand::UniformMat4(slot, value));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(BackendCommand::Clear(color));
    }

    fn draw_triangles(&mut self, buffer: VertexBufferHandle, vertex_count: u32) -> BackendResult<()> {
        let stored = self
            .buffers
            .get(buffer)
            .ok_or_else(|| RenderError::InvalidHandle(format!("{buffer:?}")))?;
        if vertex_count as usize > stored.len() || vertex_count % 3 != 0 {
            return Err(RenderError::Backend(format!(
                "cannot draw {vertex_count} vertices from a buffer of {}",
                stored.len()
            )));
        }
        self.commands.push(BackendCommand::Draw { buffer, vertex_count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_destroy_is_rejected() {
        let mut backend = RecordingBackend::new();
        let texture = backend.create_texture(&ImageData::placeholder()).unwrap();
        assert_eq!(backend.live_textures(), 1);
        backend.destroy_texture(texture).unwrap();
        assert!(matches!(backend.destroy_texture(texture), Err(RenderError::InvalidHandle(_))));
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_truncated_image_is_rejected() {
        let mut backend = RecordingBackend::new();
        let image = ImageData { data: vec![0; 5], width: 2, height: 1, channels: 3 };
        assert!(matches!(backend.create_texture(&image), Err(RenderError::ResourceCreation(_))));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let mut backend = RecordingBackend::new();
        let image = ImageData { data: vec![0; 16], width: u32::MAX, height: u32::MAX, channels: 4 };
        assert!(matches!(backend.create_texture(&image), Err(RenderError::ResourceCreation(_))));
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_draw_checks_buffer() {
        let mut backend = RecordingBackend::new();
        let buffer = backend.create_vertex_buffer(&[Vertex::default(); 3]).unwrap();
        backend.draw_triangles(buffer, 3).unwrap();
        assert!(backend.draw_triangles(buffer, 6).is_err());
        backend.destroy_vertex_buffer(buffer).unwrap();
        assert!(matches!(backend.draw_triangles(buffer, 3), Err(RenderError::InvalidHandle(_))));
        assert_eq!(backend.commands(), &[BackendCommand::Draw { buffer, vertex_count: 3 }]);
    }
}
