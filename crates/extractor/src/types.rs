use serde::{Deserialize, Serialize};

/// Which extraction path produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Syntax-tree traversal (full fidelity)
    Grammar,
    /// Regex scan over raw lines (degraded fidelity)
    LineHeuristic,
    /// Declaration scan for Jac sources (walkers, node types)
    JacPatterns,
}

impl ExtractionStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExtractionStrategy::Grammar => "grammar",
            ExtractionStrategy::LineHeuristic => "line_heuristic",
            ExtractionStrategy::JacPatterns => "jac_patterns",
        }
    }

    /// Whether this is the lower-fidelity Python fallback
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, ExtractionStrategy::LineHeuristic)
    }
}

/// A function or method definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,

    /// Start line (1-indexed)
    pub line_start: usize,

    /// End line (1-indexed, inclusive)
    pub line_end: usize,
}

impl FunctionInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        Self {
            name: name.into(),
            line_start,
            line_end,
        }
    }
}

/// A named top-level declaration located by line only (Jac walkers and
/// node types)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclarationInfo {
    pub name: String,
    pub line_start: usize,
}

impl DeclarationInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, line_start: usize) -> Self {
        Self {
            name: name.into(),
            line_start,
        }
    }
}

/// A class definition with its direct methods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,

    /// Base class names as written in source, unresolved
    #[serde(default)]
    pub bases: Vec<String>,

    pub line_start: usize,
    pub line_end: usize,

    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
}

impl ClassInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            line_start,
            line_end,
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases = bases.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: FunctionInfo) -> Self {
        self.methods.push(method);
        self
    }
}

/// Structural facts extracted from one source file.
///
/// A record with `error` set carries no usable structure: its lists are
/// empty and graph ingestion skips it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuralRecord {
    pub file_path: String,
    pub module_name: String,

    #[serde(default)]
    pub classes: Vec<ClassInfo>,

    /// Functions that are not methods of a class
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,

    /// Import statements as raw source text
    #[serde(default)]
    pub imports: Vec<String>,

    /// Jac `walker` declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walkers: Vec<DeclarationInfo>,

    /// Jac `node type` declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_types: Vec<DeclarationInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ExtractionStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StructuralRecord {
    /// Empty record for a file, to be filled by an extraction strategy
    #[must_use]
    pub fn new(
        file_path: impl Into<String>,
        module_name: impl Into<String>,
        strategy: ExtractionStrategy,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            module_name: module_name.into(),
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            walkers: Vec::new(),
            node_types: Vec::new(),
            strategy: Some(strategy),
            error: None,
        }
    }

    /// Error-bearing record with no structure
    #[must_use]
    pub fn failed(
        file_path: impl Into<String>,
        module_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            module_name: module_name.into(),
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            walkers: Vec::new(),
            node_types: Vec::new(),
            strategy: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_has_no_structure() {
        let record = StructuralRecord::failed("a.py", "a", "boom");
        assert!(record.is_error());
        assert!(record.classes.is_empty());
        assert!(record.functions.is_empty());
        assert!(record.imports.is_empty());
        assert_eq!(record.strategy, None);
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let json = r#"{"file_path":"a.py","module_name":"a","classes":[{"name":"A","line_start":1,"line_end":2}]}"#;
        let record: StructuralRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_error());
        assert_eq!(record.classes[0].bases, Vec::<String>::new());
        assert!(record.functions.is_empty());
    }

    #[test]
    fn test_only_line_heuristic_is_degraded() {
        assert!(ExtractionStrategy::LineHeuristic.is_degraded());
        assert!(!ExtractionStrategy::Grammar.is_degraded());
        assert!(!ExtractionStrategy::JacPatterns.is_degraded());
    }

    #[test]
    fn test_error_field_skipped_when_absent() {
        let record = StructuralRecord::new("a.py", "a", ExtractionStrategy::Grammar);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["strategy"], "grammar");
        assert!(value.get("walkers").is_none());
    }
}
