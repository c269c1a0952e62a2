//! A loaded OBJ model ready for upload
//!
//! Construction runs the whole ingestion pipeline: material libraries and faces
//! are read by the OBJ loader, untextured materials receive the placeholder
//! texture, and batches are ordered opaque-first.

use std::path::Path;

use crate::assets::{Diagnostic, FileImageDecoder, ImageDecoder, ObjLoader, ObjOutput};
use crate::foundation::math::{Mat4, Transform};
use crate::render::{
    partition_by_transparency, DrawBatch, Material, MaterialTable, RenderBackend, RenderError,
};
use crate::scene::gpu_scene::GpuScene;

/// Summary counts for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    /// Materials in the table
    pub materials: usize,
    /// Draw batches
    pub batches: usize,
    /// Triangles over all batches
    pub triangles: usize,
}

/// Materials, draw-ordered batches and a model transform
#[derive(Debug, Default)]
pub struct SceneObject {
    materials: MaterialTable,
    batches: Vec<DrawBatch>,
    diagnostics: Vec<Diagnostic>,
    /// Model transform
    pub transform: Transform,
}

impl SceneObject {
    /// Load an OBJ file, decoding textures with the `image` crate
    ///
    /// An unreadable file yields an object with no batches.
    pub fn load(path: impl AsRef<Path>, transform: Transform) -> Self {
        Self::load_with_decoder(path, transform, &FileImageDecoder)
    }

    /// Load an OBJ file with a custom texture decoder
    pub fn load_with_decoder(path: impl AsRef<Path>, transform: Transform, decoder: &dyn ImageDecoder) -> Self {
        let object = Self::from_obj_output(ObjLoader::load_obj(path.as_ref(), decoder), transform);
        let stats = object.stats();
        log::info!(
            "Scene {}: {} material(s), {} batch(es), {} triangle(s)",
            path.as_ref().display(),
            stats.materials,
            stats.batches,
            stats.triangles
        );
        object
    }

    /// Finish a raw OBJ scan: fill missing textures and order batches for transparency
    pub fn from_obj_output(output: ObjOutput, transform: Transform) -> Self {
        let ObjOutput { mut materials, mut batches, diagnostics } = output;

        let filled = materials.fill_missing_textures();
        if filled > 0 {
            log::debug!("{} material(s) use the placeholder texture", filled);
        }
        partition_by_transparency(&mut batches, &materials);

        Self { materials, batches, diagnostics, transform }
    }

    /// Material table
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Batches in draw order
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Problems found while loading
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Model matrix from the transform
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Material a batch is drawn with, if it resolves
    pub fn batch_material(&self, batch: &DrawBatch) -> Option<&Material> {
        batch.material().and_then(|index| self.materials.get(index))
    }

    /// Count materials, batches and triangles
    pub fn stats(&self) -> SceneStats {
        SceneStats {
            materials: self.materials.len(),
            batches: self.batches.len(),
            triangles: self.batches.iter().map(DrawBatch::triangle_count).sum(),
        }
    }

    /// Create GPU resources for every material and batch
    pub fn upload(&self, backend: &mut dyn RenderBackend) -> Result<GpuScene, RenderError> {
        GpuScene::upload(self, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, ImageData, ParseError};
    use crate::foundation::math::Vec3;
    use std::fs;
    use std::path::PathBuf;

    struct NoImages;

    impl ImageDecoder for NoImages {
        fn decode(&self, path: &Path) -> Result<ImageData, AssetError> {
            Err(AssetError::NotFound(path.display().to_string()))
        }
    }

    fn write_scene(obj: &str, mtl: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scene.mtl"), mtl).unwrap();
        let obj_path = dir.path().join("scene.obj");
        fs::write(&obj_path, obj).unwrap();
        (dir, obj_path)
    }

    #[test]
    fn test_missing_geometry_file() {
        let object = SceneObject::load("no/such/scene.obj", Transform::identity());
        assert!(object.batches().is_empty());
        assert!(object.materials().is_empty());
        assert!(matches!(object.diagnostics()[0].error, ParseError::Unreadable(_)));
    }

    #[test]
    fn test_placeholder_texture_after_construction() {
        let (_dir, path) = write_scene(
            "mtllib scene.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl plain\nf 1 2 3\n",
            "newmtl plain\nKd 0.5 0.5 0.5\nnewmtl broken\nmap_Kd gone.png\n",
        );
        let object = SceneObject::load_with_decoder(&path, Transform::identity(), &NoImages);

        for material in object.materials().iter() {
            let texture = material.texture.as_ref().unwrap();
            assert_eq!((texture.width, texture.height), (1, 1));
            assert_eq!(texture.data, vec![255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_batches_are_ordered_by_transparency() {
        let (_dir, path) = write_scene(
            "mtllib scene.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n\
             usemtl a\nf 1 2 3\nusemtl b\nf 1 2 3 4\nusemtl c\nf 2 3 4\n",
            "newmtl a\nd 0.5\nnewmtl b\nnewmtl c\nTr 0.5\n",
        );
        let object = SceneObject::load_with_decoder(&path, Transform::identity(), &NoImages);

        let names: Vec<&str> = object
            .batches()
            .iter()
            .map(|batch| object.batch_material(batch).unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(
            object.stats(),
            SceneStats { materials: 3, batches: 3, triangles: 4 }
        );
    }

    #[test]
    fn test_model_matrix_follows_transform() {
        let mut object = SceneObject::default();
        object.transform = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(object.model_matrix()[(0, 3)], 1.0);
    }
}
