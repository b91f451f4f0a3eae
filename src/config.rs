//! Application configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "exiftool-desk";
const APPLICATION: &str = "exiftool-desk";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tool: ToolConfig,
    pub templates: TemplateConfig,
}

/// Where to find the exiftool executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Used as-is when it exists; otherwise discovery falls back to `PATH`.
    pub executable: Option<PathBuf>,
    /// Directories checked after the platform's known install locations.
    pub extra_search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub path: Option<PathBuf>,
}

impl TemplateConfig {
    pub fn store_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_templates_path)
    }
}

impl AppConfig {
    /// Loads the config from `path`, or from the user config directory when
    /// `path` is `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            tracing::info!("Using default configuration");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        tracing::info!("Configuration loaded from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

pub fn default_templates_path() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join("templates.json"))
        .unwrap_or_else(|| PathBuf::from("./templates.json"))
}
