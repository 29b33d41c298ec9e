//! Test helpers shared across Atelier crates.

pub mod backend;
pub mod fixtures;

pub use backend::{FailingBackend, FixedBackend, RecordedCall, RecordingBackend, ScriptedBackend};
pub use fixtures::{result_fixture, sketch_fixture};
