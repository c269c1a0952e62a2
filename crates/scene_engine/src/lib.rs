//! # Scene Engine
//!
//! Loads Wavefront OBJ scenes with their MTL material libraries and turns them
//! into draw-ready batches for a real-time renderer.
//!
//! ## Features
//!
//! - **Forgiving Parsing**: Per-line problems are reported as diagnostics, never fatal
//! - **Fan Triangulation**: Convex n-gons become `n - 2` triangles
//! - **Material Batching**: One draw batch per contiguous `usemtl` run
//! - **Transparency Ordering**: Opaque batches draw before translucent ones
//! - **Backend Agnostic**: GPU work goes through the [`render::RenderBackend`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let object = SceneObject::load(&config.default_model, Transform::identity());
//!
//!     let mut backend = RecordingBackend::new();
//!     let gpu = object.upload(&mut backend)?;
//!
//!     let camera = CameraState::from_config(&config);
//!     let frame = FrameState::new(&camera, (config.window_width, config.window_height), &config);
//!     gpu.render(&frame, &mut backend)?;
//!
//!     gpu.release(&mut backend)?;
//!     Ok(())
//! }
//! ```

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        assets::{Diagnostic, FileImageDecoder, ImageData, ImageDecoder, ParseError},
        config::{Config, ConfigError, ViewerConfig},
        foundation::math::{Mat4, Transform, Vec3},
        render::{
            CameraInput, CameraState, DrawBatch, FrameState, Material, MaterialTable,
            RecordingBackend, RenderBackend, RenderError, Vertex,
        },
        scene::{GpuScene, SceneObject, SceneStats},
    };
}
