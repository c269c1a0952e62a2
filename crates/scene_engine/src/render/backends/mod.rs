//! Graphics backend implementations

pub mod recording;

pub use recording::{BackendCommand, RecordingBackend};
