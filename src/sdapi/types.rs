//! Request and response types for the WebUI `sdapi/v1` REST surface.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-request settings override. Selecting the checkpoint here avoids
/// switching the server's global model between requests.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideSettings {
    pub sd_model_checkpoint: String,
}

/// Body for `POST /sdapi/v1/img2img`.
#[derive(Debug, Clone, Serialize)]
pub struct Img2ImgRequest {
    /// Base64-encoded source images; the redraw path always sends one.
    pub init_images: Vec<String>,
    pub prompt: String,
    pub negative_prompt: String,
    pub override_settings: OverrideSettings,
    pub steps: u32,
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    pub sampler_name: String,
    pub cfg_scale: f64,
    pub denoising_strength: f64,
    pub restore_faces: bool,
    pub save_images: bool,
}

/// Body for `POST /sdapi/v1/txt2img`.
#[derive(Debug, Clone, Serialize)]
pub struct Txt2ImgRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub override_settings: OverrideSettings,
    pub steps: u32,
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    pub samples: u32,
    pub batch_size: u32,
    pub sampler_name: String,
    pub cfg_scale: f64,
    pub restore_faces: bool,
    pub save_images: bool,
}

/// Response from the generation endpoints. `images` holds base64 PNG data;
/// `info` is a JSON string with the parameters the server actually used.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// One entry of `GET /sdapi/v1/sd-models`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdModel {
    pub model_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// One entry of `GET /sdapi/v1/loras`.
#[derive(Debug, Clone, Deserialize)]
pub struct Lora {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Body for `POST /sdapi/v1/png-info`.
#[derive(Debug, Clone, Serialize)]
pub struct PngInfoRequest {
    pub image: String,
}

/// Embedded generation metadata read back from a PNG produced by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct PngInfo {
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub items: Value,
}
