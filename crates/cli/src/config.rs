use anyhow::{Context as AnyhowContext, Result};
use ccg_extractor::ExtractorConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--config` TOML file
///
/// ```toml
/// [extractor]
/// strategy = "grammar"
/// max_file_bytes = 1048576
/// fallback_on_grammar_failure = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub extractor: ExtractorConfig,
}

impl CliConfig {
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: CliConfig = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config
            .extractor
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
