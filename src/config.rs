//! Configuration management for sqlward.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the generative oracle and the analytical warehouse.

use crate::error::{Result, SqlwardError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for sqlward.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generative oracle configuration.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Warehouse configuration.
    #[serde(default)]
    pub warehouse: WarehouseConfig,
}

/// Generative oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Oracle provider: "gemini" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Cloud project hosting the model endpoints.
    pub project: Option<String>,

    /// Region of the model endpoints (e.g. "europe-west1").
    #[serde(default = "default_location")]
    pub location: String,

    /// Base model used for generation and judging (e.g. "gemini-2.0-flash-001").
    #[serde(default = "default_model")]
    pub model: String,

    /// Deployed fine-tuned endpoint ID, when one exists.
    pub tuned_endpoint: Option<String>,

    /// Sampling temperature for SQL generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token budget per completion.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_location() -> String {
    "europe-west1".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            project: None,
            location: default_location(),
            model: default_model(),
            tuned_endpoint: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Warehouse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Cloud project billed for queries.
    pub project: Option<String>,

    /// Dataset holding the business tables.
    pub dataset: Option<String>,

    /// Warehouse location (e.g. "EU").
    #[serde(default = "default_warehouse_location")]
    pub location: String,
}

fn default_warehouse_location() -> String {
    "EU".to_string()
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: None,
            dataset: None,
            location: default_warehouse_location(),
        }
    }
}

impl WarehouseConfig {
    /// Applies environment variables as defaults for unset fields.
    pub fn apply_env_defaults(&mut self) {
        if self.project.is_none() {
            self.project = std::env::var("SQLWARD_PROJECT")
                .or_else(|_| std::env::var("GOOGLE_CLOUD_PROJECT"))
                .ok();
        }
        if self.dataset.is_none() {
            self.dataset = std::env::var("SQLWARD_DATASET").ok();
        }
    }

    /// Returns the fully-qualified dataset reference, if configured.
    pub fn dataset_ref(&self) -> Result<String> {
        let project = self
            .project
            .as_deref()
            .ok_or_else(|| SqlwardError::config("warehouse project is required"))?;
        let dataset = self
            .dataset
            .as_deref()
            .ok_or_else(|| SqlwardError::config("warehouse dataset is required"))?;
        Ok(format!("{project}.{dataset}"))
    }
}

impl OracleConfig {
    /// Applies environment variables as defaults for unset fields.
    pub fn apply_env_defaults(&mut self) {
        if self.project.is_none() {
            self.project = std::env::var("SQLWARD_PROJECT")
                .or_else(|_| std::env::var("GOOGLE_CLOUD_PROJECT"))
                .ok();
        }
        if self.tuned_endpoint.is_none() {
            self.tuned_endpoint = std::env::var("SQLWARD_TUNED_ENDPOINT").ok();
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlward")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlwardError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SqlwardError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment defaults to both sections.
    pub fn apply_env_defaults(&mut self) {
        self.oracle.apply_env_defaults();
        self.warehouse.apply_env_defaults();
    }
}
