use std::path::Path;

use blindscore_core::{ContextParams, ScoringModel};
use blindscore_exchange::ExchangeConfig;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "blindscore.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// "rlwe" or "mock"
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub exchange: ExchangeConfig,

    #[serde(default)]
    pub context: ContextParams,

    /// Replaces the built-in scoring model on the compute side
    #[serde(default)]
    pub model: Option<ScoringModel>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// "local" or "s3"
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// Physical S3 bucket holding every logical bucket as a prefix
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default = "default_s3_endpoint")]
    pub s3_endpoint: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            local_path: default_local_path(),
            s3_bucket: None,
            s3_endpoint: default_s3_endpoint(),
        }
    }
}

fn default_backend() -> String {
    "rlwe".into()
}
fn default_storage_backend() -> String {
    "local".into()
}
fn default_local_path() -> String {
    ".blindscore/store".into()
}
fn default_s3_endpoint() -> String {
    "http://localhost:9000".into()
}

impl Config {
    /// Merge the TOML file with `BLINDSCORE_` environment variables
    ///
    /// Nested keys use `__`, e.g. `BLINDSCORE_EXCHANGE__POLL__MAX_ATTEMPTS`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(file))
                .merge(Env::prefixed("BLINDSCORE_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment.extract()?;
        config.exchange.validate()?;
        if let Some(model) = &config.model {
            model.validate()?;
        }
        Ok(config)
    }
}
