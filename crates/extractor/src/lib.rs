//! # CCG Extractor
//!
//! Per-file structural extraction for the Code Context Graph.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Language detection (from extension)
//!     │
//!     ├──> Jac declaration scan (walkers, node types)
//!     │
//!     ├──> Grammar path (tree-sitter)
//!     │      ├─ class definitions + simple-identifier bases
//!     │      ├─ methods (enclosing construct is a class body)
//!     │      ├─ other functions
//!     │      └─ import statements (raw text)
//!     │
//!     ├──> Line heuristic (degraded fallback, regex per line)
//!     │
//!     └──> StructuralRecord (error captured, never raised)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ccg_extractor::StructuralExtractor;
//!
//! let extractor = StructuralExtractor::default();
//! let record = extractor.extract_source(
//!     "shapes.py",
//!     "class Shape:\n    def area(self):\n        return 0\n",
//! );
//!
//! assert_eq!(record.module_name, "shapes");
//! assert_eq!(record.classes[0].methods[0].name, "area");
//! assert!(record.functions.is_empty());
//! ```

mod config;
mod error;
mod extractor;
mod grammar;
mod heuristic;
mod jac;
mod language;
mod types;

pub use config::ExtractorConfig;
pub use error::{ExtractError, Result};
pub use extractor::StructuralExtractor;
pub use language::SourceLanguage;
pub use types::{
    ClassInfo, DeclarationInfo, ExtractionStrategy, FunctionInfo, StructuralRecord,
};
