//! Generation backend doubles.

use async_trait::async_trait;
use atelier_client::{ClientError, GenerationBackend, Sketch};
use atelier_config::GenerationSettings;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Backend that always returns the same image.
#[derive(Debug, Clone)]
pub struct FixedBackend {
    image: Vec<u8>,
}

impl FixedBackend {
    pub fn new(image: Vec<u8>) -> Self {
        Self { image }
    }
}

#[async_trait]
impl GenerationBackend for FixedBackend {
    async fn generate(
        &self,
        _sketch: &Sketch,
        _prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError> {
        Ok(self.image.clone())
    }
}

/// Backend that always fails.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    empty_response: bool,
}

impl FailingBackend {
    /// Fail with a decoding error.
    pub fn new() -> Self {
        Self {
            empty_response: false,
        }
    }

    /// Fail with an empty-response soft failure.
    pub fn empty_response() -> Self {
        Self {
            empty_response: true,
        }
    }
}

impl Default for FailingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for FailingBackend {
    async fn generate(
        &self,
        _sketch: &Sketch,
        _prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError> {
        if self.empty_response {
            Err(ClientError::EmptyResponse)
        } else {
            Err(ClientError::Decode("scripted failure".to_string()))
        }
    }
}

/// Backend that replays a scripted sequence of outcomes, then keeps
/// returning empty responses.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<Vec<u8>, ClientError>>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<Vec<u8>, ClientError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        _sketch: &Sketch,
        _prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError> {
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Err(ClientError::EmptyResponse))
    }
}

/// One recorded call to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub settings: GenerationSettings,
    pub sketch_bytes: usize,
}

/// Backend that records calls before delegating to an inner backend.
pub struct RecordingBackend<B> {
    inner: B,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl<B> RecordingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the recorded calls so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Handle to the call log that outlives this backend.
    pub fn call_log(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl<B: GenerationBackend> GenerationBackend for RecordingBackend<B> {
    async fn generate(
        &self,
        sketch: &Sketch,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<Vec<u8>, ClientError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            settings: settings.clone(),
            sketch_bytes: sketch.png.len(),
        });
        self.inner.generate(sketch, prompt, settings).await
    }
}
