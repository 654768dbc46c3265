use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::grammar::GrammarExtractor;
use crate::heuristic;
use crate::jac;
use crate::language::{dotted_extension, module_name_for, SourceLanguage};
use crate::types::{ExtractionStrategy, StructuralRecord};
use rayon::prelude::*;
use std::path::Path;

/// Produces one [`StructuralRecord`] per source file.
///
/// Extraction never fails past this boundary: unreadable files, unsupported
/// file types and parser failures come back as records with `error` set.
pub struct StructuralExtractor {
    config: ExtractorConfig,
}

impl StructuralExtractor {
    /// Create an extractor, rejecting invalid configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate().map_err(ExtractError::invalid_config)?;
        Ok(Self { config })
    }

    /// Read and extract a file.
    ///
    /// The file type and size are checked before any content is read.
    pub fn extract(&self, path: impl AsRef<Path>) -> StructuralRecord {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        let module_name = module_name_for(path);

        let language = SourceLanguage::from_path(path);
        if !language.is_supported() {
            return unsupported(path, file_path, module_name);
        }

        match self.read_source(path) {
            Ok(content) => self.extract_with(
                &file_path,
                &module_name,
                language,
                &content,
                Self::extract_with_grammar,
            ),
            Err(e) => {
                log::debug!("{file_path}: {e}");
                StructuralRecord::failed(file_path, module_name, e.to_string())
            }
        }
    }

    /// Extract already-loaded source text
    pub fn extract_source(&self, path: impl AsRef<Path>, content: &str) -> StructuralRecord {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        let module_name = module_name_for(path);

        let language = SourceLanguage::from_path(path);
        if !language.is_supported() {
            return unsupported(path, file_path, module_name);
        }

        self.extract_with(
            &file_path,
            &module_name,
            language,
            content,
            Self::extract_with_grammar,
        )
    }

    /// Extract many files in parallel; output order matches `paths`
    pub fn extract_batch<P>(&self, paths: &[P]) -> Vec<StructuralRecord>
    where
        P: AsRef<Path> + Sync,
    {
        let records: Vec<StructuralRecord> =
            paths.par_iter().map(|path| self.extract(path)).collect();

        let failed = records.iter().filter(|r| r.is_error()).count();
        let degraded = records
            .iter()
            .filter(|r| r.strategy.is_some_and(ExtractionStrategy::is_degraded))
            .count();
        log::info!(
            "Extracted {} files ({} failed, {} degraded)",
            records.len(),
            failed,
            degraded
        );

        records
    }

    /// Route supported source to its strategy. `grammar` is the syntax-tree
    /// step; its failure falls back or fails per configuration.
    fn extract_with<G>(
        &self,
        file_path: &str,
        module_name: &str,
        language: SourceLanguage,
        content: &str,
        grammar: G,
    ) -> StructuralRecord
    where
        G: FnOnce(&str, &str, &str, SourceLanguage) -> Result<StructuralRecord>,
    {
        if content.len() > self.config.max_file_bytes {
            let err = ExtractError::TooLarge {
                size: content.len(),
                limit: self.config.max_file_bytes,
            };
            return StructuralRecord::failed(file_path, module_name, err.to_string());
        }

        if language == SourceLanguage::Jac {
            return jac::extract_declarations(content, file_path, module_name);
        }
        if self.config.strategy == ExtractionStrategy::LineHeuristic {
            return heuristic::extract_lines(content, file_path, module_name);
        }

        match grammar(content, file_path, module_name, language) {
            Ok(record) => record,
            Err(e) if self.config.fallback_on_grammar_failure => {
                log::warn!("{file_path}: grammar extraction failed, using line heuristic: {e}");
                heuristic::extract_lines(content, file_path, module_name)
            }
            Err(e) => StructuralRecord::failed(file_path, module_name, e.to_string()),
        }
    }

    fn extract_with_grammar(
        content: &str,
        file_path: &str,
        module_name: &str,
        language: SourceLanguage,
    ) -> Result<StructuralRecord> {
        let mut grammar = GrammarExtractor::new(language)?;
        grammar.extract(content, file_path, module_name)
    }

    fn read_source(&self, path: &Path) -> Result<String> {
        let size = std::fs::metadata(path)?.len();
        let limit = self.config.max_file_bytes;
        if size > limit as u64 {
            return Err(ExtractError::TooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit,
            });
        }

        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn unsupported(path: &Path, file_path: String, module_name: String) -> StructuralRecord {
    let err = ExtractError::unsupported_language(dotted_extension(path));
    StructuralRecord::failed(file_path, module_name, err.to_string())
}

impl Default for StructuralExtractor {
    fn default() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }
}
