//! Configuration schema for Atelier.

use serde::{Deserialize, Serialize};

/// Root config for the Atelier core.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AtelierConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl AtelierConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> AtelierConfigBuilder {
        AtelierConfigBuilder::new()
    }
}

/// Builder for assembling an `AtelierConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct AtelierConfigBuilder {
    config: AtelierConfig,
}

impl AtelierConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: AtelierConfig::default(),
        }
    }

    /// Replace the remote endpoint configuration.
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    /// Replace the admission gate configuration.
    pub fn admission(mut self, admission: AdmissionConfig) -> Self {
        self.config.admission = admission;
        self
    }

    /// Replace the history retention configuration.
    pub fn retention(mut self, retention: RetentionConfig) -> Self {
        self.config.retention = retention;
        self
    }

    /// Replace the generation parameter configuration.
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Replace the prompt configuration.
    pub fn prompt(mut self, prompt: PromptConfig) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Finalize and return the built `AtelierConfig`.
    pub fn build(self) -> AtelierConfig {
        self.config
    }
}

/// Remote generation endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// Base URL of the img2img service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds for a single generation call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Default img2img service URL.
fn default_base_url() -> String {
    "http://127.0.0.1:8003".to_string()
}

/// Default per-request timeout in seconds.
fn default_request_timeout_secs() -> u64 {
    300
}

/// Admission gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdmissionConfig {
    /// Minimum interval between admitted requests, in seconds.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: f64,
    /// Cadence at which the pipeline polls the gate, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Default minimum inter-request interval in seconds.
fn default_min_interval_secs() -> f64 {
    5.0
}

/// Default gate polling cadence in milliseconds.
fn default_poll_interval_ms() -> u64 {
    100
}

/// History retention configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Maximum number of retained generation records.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Maximum total size of the history directory in bytes.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

/// Default record count cap.
fn default_max_records() -> usize {
    50
}

/// Default storage cap (500 MiB).
fn default_max_total_bytes() -> u64 {
    500 * 1024 * 1024
}

/// Generation parameter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Default generation settings applied when the user has not saved any.
    #[serde(default)]
    pub settings: GenerationSettings,
    /// Factor applied to the sketch dimensions for the requested output size.
    #[serde(default = "default_upscale_factor")]
    pub upscale_factor: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            settings: GenerationSettings::default(),
            upscale_factor: default_upscale_factor(),
        }
    }
}

/// Default output upscale factor.
fn default_upscale_factor() -> u32 {
    3
}

/// User-adjustable generation parameters sent with each request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    /// Diffusion step count.
    pub steps: u32,
    /// Denoising strength in `[0, 1]`.
    pub denoising_strength: f64,
    /// Classifier-free guidance scale.
    pub cfg_scale: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            steps: 3,
            denoising_strength: 1.0,
            cfg_scale: 4.5,
        }
    }
}

impl GenerationSettings {
    /// Preset tuned for latency over fidelity.
    pub fn fast() -> Self {
        Self {
            steps: 2,
            denoising_strength: 1.0,
            cfg_scale: 4.0,
        }
    }

    /// Preset balancing latency and fidelity.
    pub fn balanced() -> Self {
        Self {
            steps: 4,
            denoising_strength: 0.9,
            cfg_scale: 5.0,
        }
    }

    /// Preset tuned for fidelity over latency.
    pub fn quality() -> Self {
        Self {
            steps: 8,
            denoising_strength: 0.85,
            cfg_scale: 7.0,
        }
    }
}

/// Prompt configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptConfig {
    /// Prompt used when the user has not customized one.
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            default_prompt: default_prompt(),
        }
    }
}

/// Default transform prompt.
fn default_prompt() -> String {
    "Transform this rough sketch into an awe-inspiring, photorealistic image. \
     Use the sketch only as a structural guide for composition and proportions. \
     Add realistic depth, dramatic lighting, and atmospheric effects such as \
     reflections, sky, and shadows, so the scene feels immersive and cinematic. \
     The final result should look like a stunning photograph, true to the layout \
     of the sketch but elevated into a vivid, breathtaking real-world scene"
        .to_string()
}

/// Named style presets that rewrite the prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    /// Cinematic photography.
    Photorealistic,
    /// Gallery oil painting.
    OilPainting,
    /// Anime illustration.
    Anime,
    /// Neon sci-fi.
    Cyberpunk,
    /// Soft watercolor.
    Watercolor,
}

impl StylePreset {
    /// All presets in display order.
    pub const ALL: [StylePreset; 5] = [
        StylePreset::Photorealistic,
        StylePreset::OilPainting,
        StylePreset::Anime,
        StylePreset::Cyberpunk,
        StylePreset::Watercolor,
    ];

    /// Short display label for the preset.
    pub fn label(&self) -> &'static str {
        match self {
            StylePreset::Photorealistic => "Photo",
            StylePreset::OilPainting => "Oil",
            StylePreset::Anime => "Anime",
            StylePreset::Cyberpunk => "Cyber",
            StylePreset::Watercolor => "Water",
        }
    }

    /// Prompt fragment describing the preset's style.
    pub fn prompt_snippet(&self) -> &'static str {
        match self {
            StylePreset::Photorealistic => {
                "photorealistic, stunning photograph, cinematic lighting, professional photography"
            }
            StylePreset::OilPainting => {
                "oil painting style, artistic brushstrokes, gallery quality, masterpiece"
            }
            StylePreset::Anime => {
                "anime style, vibrant colors, Studio Ghibli inspired, detailed illustration"
            }
            StylePreset::Cyberpunk => {
                "cyberpunk aesthetic, neon lights, futuristic cityscape, sci-fi atmosphere"
            }
            StylePreset::Watercolor => {
                "delicate watercolor painting, soft edges, artistic, flowing colors"
            }
        }
    }

    /// Build the full prompt for this preset.
    pub fn prompt(&self) -> String {
        format!("Transform this sketch into: {}", self.prompt_snippet())
    }
}
