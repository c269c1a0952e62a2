//! Scene objects: a loaded model and its GPU-resident counterpart

pub mod gpu_scene;
pub mod scene_object;

pub use gpu_scene::{GpuScene, MaterialUniforms};
pub use scene_object::{SceneObject, SceneStats};
