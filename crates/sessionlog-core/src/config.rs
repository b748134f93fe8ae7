use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inactivity gap (minutes) beyond which a client's next event starts a new
/// session. The comparison is strictly greater-than: a gap of exactly this
/// many minutes stays in the same session.
pub const DEFAULT_INACTIVITY_GAP_MINUTES: f64 = 15.0;

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub session: SessionRules,
    pub report: ReportConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            session: SessionRules::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from the default path
    /// (~/.config/sessionlog/config.toml), falling back to defaults if the
    /// file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sessionlog")
            .join("config.toml")
    }
}

/// Sessionization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    /// Inactivity gap in minutes; strictly-greater-than comparison.
    pub inactivity_gap_minutes: f64,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            inactivity_gap_minutes: DEFAULT_INACTIVITY_GAP_MINUTES,
        }
    }
}

/// Rendering cutoffs for the ranked report sections. Truncation applies to
/// display only, never to the underlying aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows shown in the most-engaged-clients ranking.
    pub top_clients: usize,
    /// Rows shown in the URL popularity ranking.
    pub top_urls: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_clients: 10,
            top_urls: 10,
        }
    }
}
