//! Draw batches and transparency ordering

use crate::render::material::{MaterialIndex, MaterialTable};
use crate::render::vertex::Vertex;

/// A run of triangles drawn with a single material
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    material: Option<MaterialIndex>,
    vertices: Vec<Vertex>,
}

impl DrawBatch {
    /// Create a batch from a triangle list
    ///
    /// Returns `None` for an empty list. The vertex count must be a multiple of 3.
    pub fn new(material: Option<MaterialIndex>, vertices: Vec<Vertex>) -> Option<Self> {
        debug_assert_eq!(vertices.len() % 3, 0, "batch must hold whole triangles");
        if vertices.is_empty() {
            return None;
        }
        Some(Self { material, vertices })
    }

    /// Material the batch is drawn with, `None` when no material was selected
    pub fn material(&self) -> Option<MaterialIndex> {
        self.material
    }

    /// Triangle vertices, three per triangle
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Reorder batches so more transparent materials draw after more opaque ones
///
/// The sort is stable: batches with equal transparency keep their relative order.
/// This only keeps opaque geometry from being hidden behind translucent batches;
/// overlapping translucent batches are still drawn in file order.
pub fn partition_by_transparency(batches: &mut [DrawBatch], materials: &MaterialTable) {
    batches.sort_by(|a, b| {
        materials
            .transparency_of(a.material)
            .total_cmp(&materials.transparency_of(b.material))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::Material;

    fn triangle(tag: f32) -> Vec<Vertex> {
        vec![Vertex::new([tag, 0.0, 0.0], [0.0; 3], [0.0; 2]); 3]
    }

    fn tag_of(batch: &DrawBatch) -> f32 {
        batch.vertices()[0].position[0]
    }

    #[test]
    fn test_empty_batch_is_never_created() {
        assert!(DrawBatch::new(None, Vec::new()).is_none());
    }

    #[test]
    fn test_counts() {
        let mut vertices = triangle(1.0);
        vertices.extend(triangle(2.0));
        let batch = DrawBatch::new(None, vertices).unwrap();
        assert_eq!(batch.vertex_count(), 6);
        assert_eq!(batch.triangle_count(), 2);
    }

    #[test]
    fn test_partition_is_stable() {
        let mut table = MaterialTable::new();
        let half_a = table.push(Material { transparency: 0.5, ..Material::new("a") });
        let opaque = table.push(Material::new("b"));
        let half_c = table.push(Material { transparency: 0.5, ..Material::new("c") });

        let mut batches = vec![
            DrawBatch::new(Some(half_a), triangle(1.0)).unwrap(),
            DrawBatch::new(Some(opaque), triangle(2.0)).unwrap(),
            DrawBatch::new(Some(half_c), triangle(3.0)).unwrap(),
        ];
        partition_by_transparency(&mut batches, &table);

        let order: Vec<f32> = batches.iter().map(tag_of).collect();
        assert_eq!(order, [2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_partition_treats_missing_material_as_opaque() {
        let mut table = MaterialTable::new();
        let glass = table.push(Material { transparency: 0.8, ..Material::new("glass") });

        let mut batches = vec![
            DrawBatch::new(Some(glass), triangle(1.0)).unwrap(),
            DrawBatch::new(None, triangle(2.0)).unwrap(),
        ];
        partition_by_transparency(&mut batches, &table);

        assert_eq!(batches[0].material(), None);
        assert_eq!(batches[1].material(), Some(glass));
    }
}
