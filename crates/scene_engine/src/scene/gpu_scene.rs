//! GPU-resident scene and the render traversal
//!
//! A [`GpuScene`] owns one texture per material and one vertex buffer per draw
//! batch. Handles must go back to the backend through [`GpuScene::release`];
//! dropping a scene that still holds handles logs a leak warning.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::{
    DrawBatch, FrameState, Material, RenderBackend, RenderError, TextureHandle, UniformSlot,
    VertexBufferHandle, DIFFUSE_TEXTURE_UNIT,
};
use crate::assets::ImageData;
use crate::scene::scene_object::SceneObject;

/// Scalar and color state bound with a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniforms {
    /// Diffuse color
    pub diffuse: [f32; 3],
    /// Ambient color
    pub ambient: [f32; 3],
    /// Specular color
    pub specular: [f32; 3],
    /// Emissive color
    pub emissive: [f32; 3],
    /// 0.0 opaque to 1.0 transparent
    pub transparency: f32,
    /// Index of refraction
    pub refraction_index: f32,
    /// Specular exponent
    pub specular_exponent: f32,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            diffuse: material.diffuse.into(),
            ambient: material.ambient.into(),
            specular: material.specular.into(),
            emissive: material.emissive.into(),
            transparency: material.transparency,
            refraction_index: material.refraction_index,
            specular_exponent: material.specular_exponent,
        }
    }
}

#[derive(Debug)]
struct GpuMaterial {
    texture: TextureHandle,
    uniforms: MaterialUniforms,
}

impl GpuMaterial {
    fn bind(&self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        backend.bind_texture(DIFFUSE_TEXTURE_UNIT, self.texture)?;

        let u = &self.uniforms;
        backend.set_uniform_vec3(UniformSlot::DiffuseColor, u.diffuse);
        backend.set_uniform_vec3(UniformSlot::AmbientColor, u.ambient);
        backend.set_uniform_vec3(UniformSlot::SpecularColor, u.specular);
        backend.set_uniform_vec3(UniformSlot::EmissiveColor, u.emissive);
        backend.set_uniform_f32(UniformSlot::Transparency, u.transparency);
        backend.set_uniform_f32(UniformSlot::RefractionIndex, u.refraction_index);
        backend.set_uniform_f32(UniformSlot::SpecularExponent, u.specular_exponent);
        Ok(())
    }
}

#[derive(Debug)]
struct GpuBatch {
    buffer: VertexBufferHandle,
    vertex_count: u32,
    /// Index into `GpuScene::materials`, `None` draws with the fallback material
    material: Option<usize>,
}

/// Uploaded scene: textures, vertex buffers and the model matrix
#[derive(Debug)]
pub struct GpuScene {
    materials: Vec<GpuMaterial>,
    fallback: Option<GpuMaterial>,
    batches: Vec<GpuBatch>,
    model: Mat4,
}

impl GpuScene {
    /// Upload every material texture and batch vertex stream of `object`
    ///
    /// On failure, resources created so far are released before returning.
    pub fn upload(object: &SceneObject, backend: &mut dyn RenderBackend) -> Result<Self, RenderError> {
        let mut scene = Self {
            materials: Vec::with_capacity(object.materials().len()),
            fallback: None,
            batches: Vec::with_capacity(object.batches().len()),
            model: object.model_matrix(),
        };
        match scene.create_resources(object, backend) {
            Ok(()) => Ok(scene),
            Err(e) => {
                log::error!("Scene upload failed: {}", e);
                if let Err(release_error) = scene.release(backend) {
                    log::error!("Cleanup after failed upload also failed: {}", release_error);
                }
                Err(e)
            }
        }
    }

    fn create_resources(&mut self, object: &SceneObject, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let placeholder = ImageData::placeholder();

        for material in object.materials().iter() {
            let image = material.texture.as_ref().unwrap_or(&placeholder);
            self.materials.push(GpuMaterial {
                texture: backend.create_texture(image)?,
                uniforms: MaterialUniforms::from(material),
            });
        }

        let mut unresolved = 0;
        for batch in object.batches() {
            let material = batch
                .material()
                .map(|index| index.index())
                .filter(|&index| index < self.materials.len());
            if material.is_none() {
                unresolved += 1;
            }
            self.batches.push(Self::upload_batch(batch, material, backend)?);
        }

        if unresolved > 0 {
            log::warn!("{} batch(es) have no material, drawing them with the default material", unresolved);
            let fallback = Material::fallback();
            let texture = backend.create_texture(fallback.texture.as_ref().unwrap_or(&placeholder))?;
            self.fallback = Some(GpuMaterial {
                texture,
                uniforms: MaterialUniforms::from(&fallback),
            });
        }

        log::debug!(
            "Uploaded {} texture(s) and {} vertex buffer(s)",
            self.materials.len() + usize::from(self.fallback.is_some()),
            self.batches.len()
        );
        Ok(())
    }

    fn upload_batch(
        batch: &DrawBatch,
        material: Option<usize>,
        backend: &mut dyn RenderBackend,
    ) -> Result<GpuBatch, RenderError> {
        let vertex_count = u32::try_from(batch.vertex_count())
            .map_err(|_| RenderError::ResourceCreation(format!("{} vertices in one batch", batch.vertex_count())))?;
        Ok(GpuBatch {
            buffer: backend.create_vertex_buffer(batch.vertices())?,
            vertex_count,
            material,
        })
    }

    /// Number of uploaded batches
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Set the transform uniforms, then bind and draw every batch in order
    ///
    /// A scene without batches issues nothing.
    pub fn render(&self, frame: &FrameState, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        if self.batches.is_empty() {
            return Ok(());
        }

        backend.set_uniform_mat4(UniformSlot::Model, self.model.to_cols_array());
        backend.set_uniform_mat4(UniformSlot::View, frame.view.to_cols_array());
        backend.set_uniform_mat4(UniformSlot::Projection, frame.projection.to_cols_array());

        for batch in &self.batches {
            let material = batch
                .material
                .and_then(|index| self.materials.get(index))
                .or(self.fallback.as_ref())
                .ok_or_else(|| RenderError::Backend("batch without material or fallback".to_string()))?;
            material.bind(backend)?;
            backend.draw_triangles(batch.buffer, batch.vertex_count)?;
        }
        Ok(())
    }

    /// Destroy every GPU resource owned by the scene
    ///
    /// Every handle is returned even if some destroys fail; the first error is reported.
    pub fn release(mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let mut first_error = None;
        let mut record = |result: Result<(), RenderError>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        for batch in self.batches.drain(..) {
            record(backend.destroy_vertex_buffer(batch.buffer));
        }
        for material in self.materials.drain(..).chain(self.fallback.take()) {
            record(backend.destroy_texture(material.texture));
        }

        first_error.map_or(Ok(()), Err)
    }

    fn resource_count(&self) -> usize {
        self.batches.len() + self.materials.len() + usize::from(self.fallback.is_some())
    }
}

impl Drop for GpuScene {
    fn drop(&mut self) {
        let leaked = self.resource_count();
        if leaked > 0 {
            log::warn!("GpuScene dropped without release, {} GPU resource(s) leaked", leaked);
        }
    }
}
