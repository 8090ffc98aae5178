//! Application configuration (TOML file plus environment overrides)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::PageMargins;
use crate::report::render::DEFAULT_RENDERER_URL;

/// Overrides the renderer endpoint
pub const ENV_RENDERER_ENDPOINT: &str = "PLAYWRIGHT_HTTP_ENDPOINT";
/// Overrides the template path
pub const ENV_TEMPLATE_PATH: &str = "PDF_LETTERHEAD_TEMPLATE";

fn default_template_path() -> PathBuf {
    PathBuf::from("Assets").join("antet.pdf")
}

fn default_endpoint() -> String {
    DEFAULT_RENDERER_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

/// External renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database directory for the persistent store; in-memory when unset
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Path of the persistent store, required by lookups of earlier documents
    pub fn persistent_path(&self) -> Result<&Path> {
        self.path.as_deref().ok_or_else(|| {
            Error::ConfigLoad("store.path must be configured for fetch/metadata".to_string())
        })
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Letterhead template PDF
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Page margins requested from the renderer
    #[serde(default)]
    pub layout: PageMargins,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            renderer: RendererConfig::default(),
            store: StoreConfig::default(),
            layout: PageMargins::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load ./config.toml if present, otherwise defaults
    pub fn load() -> Self {
        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Apply environment overrides on top of the file values
    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_RENDERER_ENDPOINT).ok(),
            std::env::var(ENV_TEMPLATE_PATH).ok(),
        )
    }

    fn apply_overrides(mut self, endpoint: Option<String>, template: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.renderer.endpoint = endpoint;
        }
        if let Some(template) = template.filter(|t| !t.trim().is_empty()) {
            self.template_path = PathBuf::from(template);
        }
        self
    }
}
