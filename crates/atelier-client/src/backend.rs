//! Generation backend seam and the default HTTP implementation.

use crate::error::ClientError;
use crate::types::{ImageRequest, ImageResponse, Sketch};
use async_trait::async_trait;
use atelier_config::{EndpointConfig, GenerationSettings};
use log::{debug, warn};
use std::time::Duration;

/// Path of the img2img operation on the remote service.
const IMG2IMG_PATH: &str = "/sdapi/v1/img2img";

#[async_trait]
/// Backend abstraction the pipeline dispatches generation work through.
pub trait GenerationBackend: Send + Sync {
    /// Generate a result image from a sketch.
    ///
    /// Returns the PNG bytes of the first produced image, or
    /// [`ClientError::EmptyResponse`] when the endpoint produced none.
    async fn generate(
        &self,
        sketch: &Sketch,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError>;
}

/// Backend talking to an Automatic1111-style img2img HTTP endpoint.
pub struct HttpGenerationClient {
    base_url: String,
    upscale_factor: u32,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    /// Create a client for the configured endpoint.
    pub fn new(endpoint: &EndpointConfig, upscale_factor: u32) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(endpoint, upscale_factor, client))
    }

    /// Create a client reusing a shared `reqwest::Client`.
    pub fn with_client(
        endpoint: &EndpointConfig,
        upscale_factor: u32,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            upscale_factor,
            client,
        }
    }

    /// Full URL of the img2img operation.
    fn url(&self) -> String {
        format!("{}{IMG2IMG_PATH}", self.base_url)
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate(
        &self,
        sketch: &Sketch,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError> {
        let request = ImageRequest::new(sketch, prompt, settings, self.upscale_factor);
        debug!(
            "dispatching generation (url={}, sketch_bytes={}, steps={})",
            self.url(),
            sketch.png.len(),
            settings.steps
        );

        let response = self
            .client
            .post(self.url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("generation response (status={status})");
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let decoded: ImageResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::Decode(err.to_string()))?;

        match decoded.first_image() {
            Some(Ok(image)) => Ok(image),
            Some(Err(err)) => Err(ClientError::Decode(err.to_string())),
            None => {
                warn!("generation endpoint returned no images");
                Err(ClientError::EmptyResponse)
            }
        }
    }
}
