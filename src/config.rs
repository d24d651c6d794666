use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub provider_config: ProviderConfig,
    #[serde(default)]
    pub cache_config: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Empty list means permissive CORS.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_cache_sweep_interval_seconds")]
    pub cache_sweep_interval_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_cache_sweep_interval_seconds() -> u64 {
    60
}

/// Outbound translation provider settings (Google Translate v2 compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_base_url() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_max_text_length() -> usize {
    5000
}

fn default_max_batch_size() -> usize {
    10
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_absolute_expiration_minutes")]
    pub absolute_expiration_minutes: u64,
    #[serde(default = "default_sliding_expiration_minutes")]
    pub sliding_expiration_minutes: u64,
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_absolute_expiration_minutes() -> u64 {
    5
}

fn default_sliding_expiration_minutes() -> u64 {
    2
}

fn default_max_cache_entries() -> usize {
    1000
}

fn default_key_prefix() -> String {
    "translation_".to_string()
}

impl CacheConfig {
    pub fn absolute_expiration(&self) -> Duration {
        Duration::from_secs(self.absolute_expiration_minutes.saturating_mul(60))
    }

    pub fn sliding_expiration(&self) -> Duration {
        Duration::from_secs(self.sliding_expiration_minutes.saturating_mul(60))
    }
}

impl Config {
    /// Load configuration from a JSON or YAML file, substituting `${VAR}`
    /// placeholders from the environment.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = read_text_file(path)?;
        let content = substitute_env_vars(&content);

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".jsonld") || path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.system_config.port == 0 {
            anyhow::bail!("system_config.port must be non-zero");
        }
        if self.provider_config.timeout_seconds == 0 {
            anyhow::bail!("provider_config.timeout_seconds must be greater than zero");
        }
        if self.provider_config.max_text_length == 0 {
            anyhow::bail!("provider_config.max_text_length must be greater than zero");
        }
        if self.provider_config.max_batch_size == 0 {
            anyhow::bail!("provider_config.max_batch_size must be greater than zero");
        }
        if self.cache_config.absolute_expiration_minutes == 0
            || self.cache_config.sliding_expiration_minutes == 0
        {
            anyhow::bail!("cache_config expiration windows must be greater than zero");
        }
        if self.cache_config.max_cache_entries == 0 {
            anyhow::bail!("cache_config.max_cache_entries must be greater than zero");
        }
        Ok(())
    }
}

/// Read a UTF-8 text file, dropping a leading BOM if present.
fn read_text_file(path: &str) -> Result<String> {
    let bytes = fs::read(path)?;
    let (cow, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        anyhow::bail!("Configuration file is not valid UTF-8: {}", path);
    }
    Ok(cow.into_owned())
}

/// Replace `${VAR_NAME}` with the variable's value; unset variables become empty.
fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: default_cors_allowed_origins(),
            cache_sweep_interval_seconds: default_cache_sweep_interval_seconds(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            max_retry_attempts: default_max_retry_attempts(),
            max_text_length: default_max_text_length(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            absolute_expiration_minutes: default_absolute_expiration_minutes(),
            sliding_expiration_minutes: default_sliding_expiration_minutes(),
            max_cache_entries: default_max_cache_entries(),
            key_prefix: default_key_prefix(),
        }
    }
}
