use std::env;
use std::time::Duration;

use anyhow::Result;
use once_cell::sync::Lazy;

/// Default Replicate model version for portrait generation (SDXL).
const DEFAULT_MODEL_VERSION: &str =
    "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b";

/// Fixed generation parameters sent with every submission. These are service
/// policy, not caller input.
pub const IMAGE_WIDTH: u32 = 1024;
pub const IMAGE_HEIGHT: u32 = 1024;
pub const NUM_OUTPUTS: u32 = 1;
pub const GUIDANCE_SCALE: u32 = 7;
pub const NUM_INFERENCE_STEPS: u32 = 30;

/// Polling cadence for asynchronous generation jobs.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1500);
pub const POLL_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub log_level: String,
    pub database_url: String,
    pub replicate_api_token: String,
    pub replicate_base_url: String,
    pub replicate_model_version: String,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_env(name: &str) -> Result<String> {
    let value = env::var(name).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(anyhow::anyhow!("{name} is required"));
    }
    Ok(value)
}

impl Config {
    pub fn load() -> Result<Self> {
        let replicate_base_url = env_string("REPLICATE_BASE_URL", "https://api.replicate.com");
        url::Url::parse(&replicate_base_url)
            .map_err(|err| anyhow::anyhow!("REPLICATE_BASE_URL is not a valid URL: {err}"))?;

        Ok(Config {
            bind_addr: env_string("BIND_ADDR", "0.0.0.0:8080"),
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            database_url: required_env("DATABASE_URL")?,
            replicate_api_token: required_env("REPLICATE_API_TOKEN")?,
            replicate_base_url,
            replicate_model_version: env_string("REPLICATE_MODEL_VERSION", DEFAULT_MODEL_VERSION),
        })
    }
}
