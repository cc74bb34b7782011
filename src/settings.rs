use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

const SETTINGS_FILE: &str = "settings.toml";

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub slack: SlackSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    #[serde(default = "default_api_base", rename = "api-base")]
    pub api_base: String,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Sender handles whose search matches are never treated as mentions
    #[serde(default = "default_excluded_handles", rename = "excluded-handles")]
    pub excluded_handles: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            excluded_handles: default_excluded_handles(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_excluded_handles() -> Vec<String> {
    vec!["slackbot".to_string()]
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| AppError::TomlParse(e.to_string()))
    }
}
