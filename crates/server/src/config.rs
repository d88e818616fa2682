//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path to the trained model artifact (.json or .onnx)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA256 of the model artifact, checked at load when set
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Address to bind the HTTP server to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("vehicle_price_model.json")
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_sha256: None,
            listen_addr: default_listen_addr(),
            port: default_port(),
            log_format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `pricer.*` file, then `PRICER_*`
    /// environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("pricer").required(false))
            .add_source(config::Environment::with_prefix("PRICER"))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}
