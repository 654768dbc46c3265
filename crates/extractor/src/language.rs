use crate::error::{ExtractError, Result};
use std::path::Path;

/// Source language recognised by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Python,
    Jac,
    Unknown,
}

impl SourceLanguage {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" => SourceLanguage::Python,
            "jac" => SourceLanguage::Jac,
            _ => SourceLanguage::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(SourceLanguage::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            SourceLanguage::Python => "python",
            SourceLanguage::Jac => "jac",
            SourceLanguage::Unknown => "unknown",
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, SourceLanguage::Python | SourceLanguage::Jac)
    }

    /// Get Tree-sitter language instance (Python only)
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            SourceLanguage::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            SourceLanguage::Jac | SourceLanguage::Unknown => {
                Err(ExtractError::unsupported_language(self.as_str()))
            }
        }
    }
}

/// Module name for a path: the file stem for supported sources, the full
/// base name otherwise.
pub fn module_name_for(path: &Path) -> String {
    let stem = if SourceLanguage::from_path(path).is_supported() {
        path.file_stem()
    } else {
        path.file_name()
    };
    stem.and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Dotted extension (".rs") used in unsupported-file errors
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
