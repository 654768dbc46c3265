use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while extracting structure from a source file.
///
/// These never escape [`crate::StructuralExtractor::extract`]; they are
/// rendered into the `error` field of the returned record.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to read the source file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The grammar-aware parser produced no tree
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No extractor exists for this file type
    #[error("Unsupported file type: {0}")]
    UnsupportedLanguage(String),

    /// Source exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Tree-sitter setup error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExtractError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(ext: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(ext.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
