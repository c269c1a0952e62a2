//! Materials and the material table
//!
//! Materials use the Wavefront Phong parameter set. The table keeps every material
//! in definition order; draw batches refer to entries by [`MaterialIndex`].

use std::collections::HashMap;

use crate::assets::ImageData;
use crate::foundation::math::Vec3;

/// Index of a material inside a [`MaterialTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialIndex(usize);

impl MaterialIndex {
    /// Position within the table
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named surface description
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name from `newmtl`
    pub name: String,
    /// Diffuse color (Kd)
    pub diffuse: Vec3,
    /// Ambient color (Ka)
    pub ambient: Vec3,
    /// Specular color (Ks)
    pub specular: Vec3,
    /// Emissive color (Ke)
    pub emissive: Vec3,
    /// 0.0 = opaque, 1.0 = fully transparent
    pub transparency: f32,
    /// Index of refraction (Ni)
    pub refraction_index: f32,
    /// Specular exponent (Ns)
    pub specular_exponent: f32,
    /// Illumination model (illum)
    pub illumination_model: Option<u32>,
    /// Diffuse texture (map_Kd); replaced by the placeholder when absent after loading
    pub texture: Option<ImageData>,
}

impl Material {
    /// Create a material with default properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            ambient: Vec3::zeros(),
            specular: Vec3::zeros(),
            emissive: Vec3::zeros(),
            transparency: 0.0,
            refraction_index: 1.0,
            specular_exponent: 1.0,
            illumination_model: None,
            texture: None,
        }
    }

    /// Material bound for batches that never selected one
    pub fn fallback() -> Self {
        Self {
            texture: Some(ImageData::placeholder()),
            ..Self::new("default")
        }
    }
}

/// Ordered collection of materials with name lookup
///
/// Storage is never deduplicated. Name lookup returns the most recently added
/// material with that name.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialIndex>,
}

impl MaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a material, shadowing any earlier one with the same name
    pub fn push(&mut self, material: Material) -> MaterialIndex {
        let index = MaterialIndex(self.materials.len());
        self.by_name.insert(material.name.clone(), index);
        self.materials.push(material);
        index
    }

    /// Append every material of `other`, in order
    pub fn append(&mut self, other: Self) {
        for material in other.materials {
            self.push(material);
        }
    }

    /// Resolve a material name (last definition wins)
    pub fn find(&self, name: &str) -> Option<MaterialIndex> {
        self.by_name.get(name).copied()
    }

    /// Material at `index`
    pub fn get(&self, index: MaterialIndex) -> Option<&Material> {
        self.materials.get(index.0)
    }

    /// Mutable material at `index`
    pub fn get_mut(&mut self, index: MaterialIndex) -> Option<&mut Material> {
        self.materials.get_mut(index.0)
    }

    /// Transparency of an optional material reference; missing materials count as opaque
    pub fn transparency_of(&self, index: Option<MaterialIndex>) -> f32 {
        index
            .and_then(|index| self.get(index))
            .map_or(0.0, |material| material.transparency)
    }

    /// Give every material without a texture the 1x1 white placeholder
    ///
    /// Returns how many materials received the placeholder.
    pub fn fill_missing_textures(&mut self) -> usize {
        let mut filled = 0;
        for material in self.materials.iter_mut().filter(|m| m.texture.is_none()) {
            material.texture = Some(ImageData::placeholder());
            filled += 1;
        }
        filled
    }

    /// Iterate materials in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when the table holds no materials
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
