//! Remote img2img client for Atelier.
//!
//! Owns the wire types for the generation endpoint, the [`GenerationBackend`]
//! seam the pipeline dispatches through, and the default HTTP implementation.

mod backend;
mod error;
mod types;

/// Backend seam and the reqwest-based implementation.
pub use backend::{GenerationBackend, HttpGenerationClient};
/// Client error type.
pub use error::ClientError;
/// Wire types and the sketch payload.
pub use types::{ImageRequest, ImageResponse, Sketch};
