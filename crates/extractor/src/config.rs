use crate::types::ExtractionStrategy;
use serde::{Deserialize, Serialize};

/// Configuration for structural extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Preferred extraction strategy
    pub strategy: ExtractionStrategy,

    /// Files larger than this become error records
    pub max_file_bytes: usize,

    /// Drop to the line heuristic when the grammar parser fails.
    /// When disabled, a grammar failure yields an error record instead.
    pub fallback_on_grammar_failure: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::Grammar,
            max_file_bytes: 4 * 1024 * 1024,
            fallback_on_grammar_failure: true,
        }
    }
}

impl ExtractorConfig {
    /// Line-heuristic only. Lower fidelity: misjudges one-line bodies,
    /// decorated definitions and mixed tab/space indentation.
    pub fn degraded() -> Self {
        Self {
            strategy: ExtractionStrategy::LineHeuristic,
            ..Default::default()
        }
    }

    /// Strict grammar mode: parser failures are reported, not papered over
    pub fn strict() -> Self {
        Self {
            fallback_on_grammar_failure: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_bytes == 0 {
            return Err("max_file_bytes must be > 0".to_string());
        }

        Ok(())
    }
}
