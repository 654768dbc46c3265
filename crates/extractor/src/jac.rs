//! Declaration scanner for Jac sources.
//!
//! Jac has no grammar available here, so only `walker` and `node type`
//! declarations are located, by fixed patterns over the whole text. Jac
//! files carry no classes, functions or imports.

use crate::types::{DeclarationInfo, ExtractionStrategy, StructuralRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static WALKER_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"walker\s+(\w+)\s*\{").expect("valid walker pattern"));

static NODE_TYPE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"node\s+type\s+(\w+)\s*\{").expect("valid node type pattern"));

/// Collect walker and node-type declarations with their 1-indexed lines
pub fn extract_declarations(content: &str, file_path: &str, module_name: &str) -> StructuralRecord {
    let mut record = StructuralRecord::new(file_path, module_name, ExtractionStrategy::JacPatterns);
    let lines = LineIndex::new(content);

    record.walkers = scan(&WALKER_DECL, content, &lines);
    record.node_types = scan(&NODE_TYPE_DECL, content, &lines);
    record
}

fn scan(pattern: &Regex, content: &str, lines: &LineIndex) -> Vec<DeclarationInfo> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(DeclarationInfo::new(name.as_str(), lines.line_of(whole.start())))
        })
        .collect()
}

/// Byte offsets of every line start
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}
