use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Loglens application.
///
/// Loaded from `~/.loglens/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoglensConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl LoglensConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LoglensConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// API server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            log_level: "info".to_string(),
        }
    }
}

/// How the agent reacts to a question it cannot translate into a query plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorMode {
    /// Answer with a clarification listing the supported question forms.
    #[default]
    Clarify,
    /// Surface a query error, which the controller folds into the transcript.
    Fail,
}

/// Question-answering agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Log each query plan and execution step at info level instead of debug.
    pub verbose: bool,
    /// What to do when a question cannot be parsed into a query plan.
    pub on_parse_error: ParseErrorMode,
    /// Maximum number of categories drawn in a count plot.
    pub max_chart_categories: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            on_parse_error: ParseErrorMode::Clarify,
            max_chart_categories: 12,
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Number of rows shown in the dataset preview.
    pub preview_rows: usize,
    /// Pre-written questions offered as one-click actions.
    pub example_questions: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            preview_rows: 5,
            example_questions: vec![
                "Analyze traffic patterns for potential DDoS attacks".to_string(),
                "display a count plot for the status column".to_string(),
                "List total number bots in the data".to_string(),
                "detect the total number of GET requests".to_string(),
            ],
        }
    }
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Rendered chart width in pixels.
    pub width: u32,
    /// Rendered chart height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
        }
    }
}
