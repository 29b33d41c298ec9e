//! Wire types for the img2img endpoint.

use atelier_config::GenerationSettings;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// A composed sketch ready to send: encoded PNG bytes plus pixel dimensions.
///
/// The core never decodes image content; dimensions come from the drawing
/// surface that rendered the bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    /// PNG-encoded bitmap.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Sketch {
    /// Create a sketch payload.
    pub fn new(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }
}

/// Request body for the img2img endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRequest {
    /// Text prompt guiding the generation.
    pub prompt: String,
    /// Base64-encoded source images; always exactly one.
    pub init_images: Vec<String>,
    /// Denoising strength in `[0, 1]`.
    pub denoising_strength: f64,
    /// Diffusion step count.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub cfg_scale: f64,
    /// Number of images to produce per request.
    pub batch_count: u32,
    /// Requested output height in pixels.
    pub height: u32,
    /// Requested output width in pixels.
    pub width: u32,
}

impl ImageRequest {
    /// Build a request from a sketch, asking the endpoint for an output
    /// upscaled from the sketch dimensions.
    pub fn new(
        sketch: &Sketch,
        prompt: &str,
        settings: &GenerationSettings,
        upscale_factor: u32,
    ) -> Self {
        Self {
            prompt: prompt.to_string(),
            init_images: vec![BASE64.encode(&sketch.png)],
            denoising_strength: settings.denoising_strength,
            steps: settings.steps,
            cfg_scale: settings.cfg_scale,
            batch_count: 1,
            height: sketch.height * upscale_factor,
            width: sketch.width * upscale_factor,
        }
    }
}

/// Response body from the img2img endpoint.
///
/// An empty `images` list means the endpoint produced nothing this round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageResponse {
    /// Base64-encoded result images.
    pub images: Vec<String>,
}

impl ImageResponse {
    /// Decode the first returned image, if any.
    pub fn first_image(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.images.first().map(|encoded| BASE64.decode(encoded))
    }
}
