//! Stable Diffusion WebUI redraw client
//!
//! Modules:
//! - `sdapi`: Thin client for the WebUI `sdapi/v1` REST endpoints.
//! - `redraw`: Directory polling loop driving img2img style conversion.
//! - `utils`: Image helpers (dimensions, size clamping, base64 codec).
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `SdApiClient`,
//! and `RedrawLoop`.
pub mod config;
pub mod error;
pub mod redraw;
pub mod sdapi;
pub mod utils;

pub use config::Config;
pub use redraw::RedrawLoop;
pub use sdapi::client::SdApiClient;
