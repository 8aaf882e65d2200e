use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tilib_indicators::IndicatorConfig;

/// Indicators to replay, read from a TOML file of `[[indicator]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    #[serde(rename = "indicator", default)]
    pub indicators: Vec<IndicatorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorEntry {
    /// Display name; defaults to the kind plus its position in the file.
    pub name: Option<String>,
    #[serde(flatten)]
    pub config: IndicatorConfig,
}

impl ReplayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: ReplayConfig = toml::from_str(text)?;
        if config.indicators.is_empty() {
            anyhow::bail!("No [[indicator]] entries configured");
        }
        Ok(config)
    }
}

impl IndicatorEntry {
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.config.kind(), index))
    }
}
