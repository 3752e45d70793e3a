//! Thin HTTP client for Stable Diffusion WebUI endpoints.
//!
//! - `check_availability` probes `GET /docs` and never fails.
//! - `img2img`/`txt2img` post typed payloads to the generation endpoints.
//! - The model listing and refresh calls cover `/sdapi/v1/sd-models`,
//!   `/sdapi/v1/loras` and their refresh counterparts.
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::sdapi::types::{
    GenerationResponse, Img2ImgRequest, Lora, PngInfo, PngInfoRequest, SdModel, Txt2ImgRequest,
};

#[derive(Clone)]
pub struct SdApiClient {
    client: Client,
    base_url: String,
}

impl SdApiClient {
    pub fn new(base_url: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        SdApiClient { client: Client::new(), base_url: base }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the WebUI. Any transport error or non-success status is logged
    /// and reported as unavailable; this call never returns an error.
    pub async fn check_availability(&self) -> bool {
        let url = format!("{}/docs", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("WebUI reachable at {}", self.base_url);
                true
            }
            Ok(response) => {
                tracing::error!("Availability probe failed. Status: {}", response.status());
                false
            }
            Err(e) => {
                tracing::error!("Availability probe failed: {}", e);
                false
            }
        }
    }

    /// List the checkpoints the server can load.
    pub async fn list_models(&self) -> AppResult<Vec<SdModel>> {
        self.get_json("/sdapi/v1/sd-models").await
    }

    /// List the LoRA overlays the server has discovered.
    pub async fn list_loras(&self) -> AppResult<Vec<Lora>> {
        self.get_json("/sdapi/v1/loras").await
    }

    pub async fn refresh_checkpoints(&self) -> AppResult<()> {
        self.post_refresh("/sdapi/v1/refresh-checkpoints").await
    }

    pub async fn refresh_loras(&self) -> AppResult<()> {
        self.post_refresh("/sdapi/v1/refresh-loras").await
    }

    /// Refresh both server-side model caches. Best-effort: each call logs its
    /// outcome and a failure never propagates to the caller.
    pub async fn reload_models(&self) {
        for result in [self.refresh_checkpoints().await, self.refresh_loras().await] {
            match result {
                Ok(()) => tracing::info!("Model cache refreshed"),
                Err(e) => tracing::error!("Model cache refresh failed: {}", e),
            }
        }
    }

    /// Read the generation metadata embedded in a PNG produced by the server.
    pub async fn png_info(&self, image_base64: &str) -> AppResult<PngInfo> {
        let url = format!("{}/sdapi/v1/png-info", self.base_url);
        let body = PngInfoRequest { image: image_base64.to_string() };
        let response = self.client.post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(AppError::Api(format!("Failed to read png-info: {:?}", response.status())))
        }
    }

    /// Perform an img2img style conversion.
    ///
    /// Returns the parsed response on success. On a non-success status the
    /// response body is read and logged, and the call fails with `AppError::Api`.
    pub async fn img2img(&self, request: &Img2ImgRequest) -> AppResult<GenerationResponse> {
        self.post_generation("/sdapi/v1/img2img", request).await
    }

    /// Generate images from text alone.
    pub async fn txt2img(&self, request: &Txt2ImgRequest) -> AppResult<GenerationResponse> {
        self.post_generation("/sdapi/v1/txt2img", request).await
    }

    async fn post_generation<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<GenerationResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::info!("Sending generation request to {}", url);

        let response = self.client.post(&url)
            .json(body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            let parsed: GenerationResponse = response.json().await.map_err(AppError::HttpClient)?;
            tracing::info!("Generation succeeded ({} image(s))", parsed.images.len());
            Ok(parsed)
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_message = format!("Generation failed. Status: {}, Body: {}", status, error_body);
            tracing::error!("{}", error_message);
            Err(AppError::Api(error_message))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(AppError::Api(format!("Failed to GET {}: {:?}", path, response.status())))
        }
    }

    async fn post_refresh(&self, path: &str) -> AppResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url)
            .json(&json!({"accept": "application/json"}))
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Api(format!("Failed to POST {}: {:?}", path, response.status())))
        }
    }
}
