//! Env-driven configuration for the daemon and CLI.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
//! Numeric and boolean fields are parsed and validated here so a malformed
//! value fails at startup rather than on the first request.
use std::env;
use std::str::FromStr;

use dotenv;

use crate::error::{AppError, AppResult};

const ENV_KEYS: &[&str] = &[
    "SDAPI_URL",
    "WATCH_DIR",
    "SD_MODEL_CHECKPOINT",
    "PROMPT",
    "NEGATIVE_PROMPT",
    "STEPS",
    "SEED",
    "SAMPLES",
    "BATCH_SIZE",
    "SAMPLER_NAME",
    "CFG_SCALE",
    "DENOISING_STRENGTH",
    "RESTORE_FACES",
    "SAVE_IMAGES",
    "POLL_INTERVAL_SECS",
    "FILTER_EXTENSIONS",
];

const DEFAULT_PROMPT: &str = "simple anime style, 2D, celshading, thick lineart, \
heavy black ink lines, posterized, flat color, celshading, toonshading, \
Cartoon Rendering, Flat Shading, Graphic Novel Style, minimal shading, \
flat shading, hard color shading";

const DEFAULT_NEGATIVE_PROMPT: &str = "text, watermark, negativeXL_D";

#[derive(Debug, Clone)]
pub struct Config {
    pub sdapi_url: String,
    pub watch_dir: String,
    pub sd_model_checkpoint: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub steps: u32,
    pub seed: i64,
    pub samples: u32,
    pub batch_size: u32,
    pub sampler_name: String,
    pub cfg_scale: f64,
    pub denoising_strength: f64,
    pub restore_faces: bool,
    pub save_images: bool,
    pub poll_interval_secs: u64,
    pub filter_extensions: bool,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        let config = Config {
            sdapi_url: string_var("SDAPI_URL", "http://127.0.0.1:7860"),
            watch_dir: string_var("WATCH_DIR", "./watch"),
            sd_model_checkpoint: string_var("SD_MODEL_CHECKPOINT", "pixlAnimeCartoonComic_v10"),
            prompt: string_var("PROMPT", DEFAULT_PROMPT),
            negative_prompt: string_var("NEGATIVE_PROMPT", DEFAULT_NEGATIVE_PROMPT),
            steps: parsed_var("STEPS", 20)?,
            seed: parsed_var("SEED", -1)?,
            samples: parsed_var("SAMPLES", 1)?,
            batch_size: parsed_var("BATCH_SIZE", 1)?,
            sampler_name: string_var("SAMPLER_NAME", "Euler a"),
            cfg_scale: parsed_var("CFG_SCALE", 7.0)?,
            denoising_strength: parsed_var("DENOISING_STRENGTH", 0.5)?,
            restore_faces: bool_var("RESTORE_FACES", true)?,
            save_images: bool_var("SAVE_IMAGES", true)?,
            poll_interval_secs: parsed_var("POLL_INTERVAL_SECS", 5)?,
            filter_extensions: bool_var("FILTER_EXTENSIONS", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.watch_dir.is_empty() {
            return Err(AppError::Config("WATCH_DIR must not be empty".to_string()));
        }
        if self.steps == 0 {
            return Err(AppError::Config("STEPS must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.denoising_strength) {
            return Err(AppError::Config(format!(
                "DENOISING_STRENGTH must be between 0 and 1, got {}",
                self.denoising_strength
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::Config("POLL_INTERVAL_SECS must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn print_env_vars() {
        for key in ENV_KEYS {
            println!("{}: {}", key, env::var(key).unwrap_or_else(|_| "<unset>".to_string()));
        }
    }
}

fn string_var(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Config(format!("invalid {}: '{}' ({})", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}

fn bool_var(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => parse_bool(&raw).ok_or_else(|| {
            AppError::Config(format!("invalid {}: '{}' (expected true/false or 1/0)", key, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            sdapi_url: "http://127.0.0.1:7860".to_string(),
            watch_dir: "./watch".to_string(),
            sd_model_checkpoint: "test_checkpoint".to_string(),
            prompt: "a prompt".to_string(),
            negative_prompt: "a negative prompt".to_string(),
            steps: 20,
            seed: -1,
            samples: 1,
            batch_size: 1,
            sampler_name: "Euler a".to_string(),
            cfg_scale: 7.0,
            denoising_strength: 0.5,
            restore_faces: true,
            save_images: true,
            poll_interval_secs: 5,
            filter_extensions: true,
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_steps_rejected() {
        let mut config = base_config();
        config.steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_denoising_rejected() {
        let mut config = base_config();
        config.denoising_strength = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DENOISING_STRENGTH"));
    }

    #[test]
    fn empty_watch_dir_rejected() {
        let mut config = base_config();
        config.watch_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bool_parsing_accepts_common_forms() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }
}
