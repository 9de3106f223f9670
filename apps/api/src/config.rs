use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::matching::cache::{CacheConfig, CacheKeyPolicy};

const SERPAPI_PLACEHOLDER: &str = "your_serpapi_key_here";
const OPENAI_PLACEHOLDER: &str = "your_openai_api_key_here";

/// Application configuration loaded from environment variables.
/// Every variable is optional; missing API keys degrade features instead of aborting startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub serpapi_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub use_simple_matching: bool,
    pub default_location: String,
    pub serpapi_country: String,
    pub embedding_cache: CacheConfig,
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            serpapi_key: None,
            openai_api_key: None,
            use_simple_matching: false,
            default_location: "Sri Lanka".to_string(),
            serpapi_country: "lk".to_string(),
            embedding_cache: CacheConfig::default(),
            data_dir: PathBuf::from("data"),
            port: 3000,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let key_policy = match std::env::var("EMBEDDING_CACHE_KEY") {
            Ok(v) => v
                .parse::<CacheKeyPolicy>()
                .map_err(anyhow::Error::msg)
                .context("EMBEDDING_CACHE_KEY must be 'prefix' or 'sha256'")?,
            Err(_) => defaults.embedding_cache.key_policy,
        };

        Ok(Config {
            serpapi_key: optional_secret("SERPAPI_KEY", SERPAPI_PLACEHOLDER),
            openai_api_key: optional_secret("OPENAI_API_KEY", OPENAI_PLACEHOLDER),
            use_simple_matching: std::env::var("USE_SIMPLE_MATCHING")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.use_simple_matching),
            default_location: std::env::var("DEFAULT_LOCATION")
                .unwrap_or(defaults.default_location),
            serpapi_country: std::env::var("SERPAPI_COUNTRY").unwrap_or(defaults.serpapi_country),
            embedding_cache: CacheConfig {
                key_policy,
                capacity: optional_parse::<NonZeroUsize>("EMBEDDING_CACHE_CAPACITY")?,
                ttl: optional_parse::<u64>("EMBEDDING_CACHE_TTL_SECS")?.map(Duration::from_secs),
            },
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

/// Reads a secret, treating empty values and the `.env.example` placeholder as unset.
fn optional_secret(key: &str, placeholder: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != placeholder)
}

fn optional_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(None),
    }
}
