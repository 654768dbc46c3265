//! Line-oriented fallback extractor.
//!
//! Degraded mode: definitions are found with fixed regular patterns and
//! top-level-ness is read from leading whitespace alone. It misjudges
//! one-line bodies, decorator-prefixed definitions and mixed tab/space
//! indentation, so records produced here are tagged
//! [`ExtractionStrategy::LineHeuristic`] and the extractor only uses it
//! when asked to or when the grammar path is unavailable.

use crate::types::{ClassInfo, ExtractionStrategy, FunctionInfo, StructuralRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*class\s+(\w+)(?:\(([^)]+)\))?").expect("valid class pattern")
});

static FUNCTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*def\s+(\w+)").expect("valid def pattern"));

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:from\s+[\w.]+)?\s*import\s+(.+)").expect("valid import pattern")
});

/// Scan raw lines for class, def and import statements
pub fn extract_lines(content: &str, file_path: &str, module_name: &str) -> StructuralRecord {
    let mut record =
        StructuralRecord::new(file_path, module_name, ExtractionStrategy::LineHeuristic);
    // Index of the class that indented defs attach to
    let mut open_class: Option<usize> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = CLASS_HEADER.captures(line) {
            let bases = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|b| !b.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            open_class = Some(record.classes.len());
            record
                .classes
                .push(ClassInfo::new(&caps[1], line_no, line_no).with_bases(bases));
            continue;
        }

        if let Some(caps) = FUNCTION_HEADER.captures(line) {
            let info = FunctionInfo::new(&caps[1], line_no, line_no);
            if is_top_level(line) {
                open_class = None;
                record.functions.push(info);
            } else if let Some(slot) = open_class {
                record.classes[slot].methods.push(info);
            }
            continue;
        }

        if IMPORT_LINE.is_match(line) {
            record.imports.push(line.trim().to_string());
        }
    }

    record
}

/// No leading 4-space block or tab
fn is_top_level(line: &str) -> bool {
    !line.starts_with("    ") && !line.starts_with('\t')
}
