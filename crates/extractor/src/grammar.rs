use crate::error::{ExtractError, Result};
use crate::language::SourceLanguage;
use crate::types::{ClassInfo, ExtractionStrategy, FunctionInfo, StructuralRecord};
use std::collections::HashMap;
use tree_sitter::{Node, Parser};

/// Node kinds that sit between a definition and the construct that owns it
const TRANSPARENT_WRAPPERS: &[&str] = &["block", "decorated_definition"];

const IMPORT_KINDS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// Syntax-tree based structural extractor
pub struct GrammarExtractor {
    parser: Parser,
    language: SourceLanguage,
}

impl GrammarExtractor {
    pub fn new(language: SourceLanguage) -> Result<Self> {
        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ExtractError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, language })
    }

    /// Parse `content` and collect classes, methods, functions and imports
    pub fn extract(
        &mut self,
        content: &str,
        file_path: &str,
        module_name: &str,
    ) -> Result<StructuralRecord> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ExtractError::parse("Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            log::debug!(
                "{file_path}: {} syntax tree contains error nodes",
                self.language.as_str()
            );
        }

        let mut record =
            StructuralRecord::new(file_path, module_name, ExtractionStrategy::Grammar);
        // tree-sitter node id -> index into record.classes
        let mut class_slots: HashMap<usize, usize> = HashMap::new();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "class_definition" => {
                    class_slots.insert(node.id(), record.classes.len());
                    record.classes.push(Self::class_info(content, node));
                }
                "function_definition" => {
                    let info = Self::function_info(content, node);
                    let owner = Self::enclosing_construct(node)
                        .filter(|owner| owner.kind() == "class_definition")
                        .and_then(|owner| class_slots.get(&owner.id()).copied());
                    match owner {
                        Some(slot) => record.classes[slot].methods.push(info),
                        None => record.functions.push(info),
                    }
                }
                kind if IMPORT_KINDS.contains(&kind) => {
                    record.imports.push(node_text(content, node).to_string());
                    continue;
                }
                _ => {}
            }

            // Reverse push keeps pre-order document order on pop
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(record)
    }

    fn class_info(content: &str, node: Node) -> ClassInfo {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(content, n))
            .unwrap_or_default();

        // Only plain identifiers count as bases; `mod.Base`, `Generic[T]`
        // and keyword arguments are ignored.
        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for child in superclasses.children(&mut cursor) {
                if child.kind() == "identifier" {
                    bases.push(node_text(content, child).to_string());
                }
            }
        }

        ClassInfo::new(name, line_start(node), line_end(node)).with_bases(bases)
    }

    fn function_info(content: &str, node: Node) -> FunctionInfo {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(content, n))
            .unwrap_or_default();
        FunctionInfo::new(name, line_start(node), line_end(node))
    }

    /// Nearest ancestor that is not a body block or decorator wrapper
    fn enclosing_construct(node: Node) -> Option<Node> {
        let mut current = node.parent()?;
        while TRANSPARENT_WRAPPERS.contains(&current.kind()) {
            current = current.parent()?;
        }
        Some(current)
    }
}

fn node_text<'a>(content: &'a str, node: Node) -> &'a str {
    content
        .get(node.start_byte()..node.end_byte())
        .unwrap_or_default()
        .trim()
}

fn line_start(node: Node) -> usize {
    node.start_position().row + 1
}

fn line_end(node: Node) -> usize {
    node.end_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(code: &str) -> StructuralRecord {
        let mut extractor = GrammarExtractor::new(SourceLanguage::Python).unwrap();
        extractor.extract(code, "sample.py", "sample").unwrap()
    }

    #[test]
    fn test_classes_methods_and_functions() {
        let code = r#"import os
from typing import List

class Base:
    def run(self):
        pass

class Derived(Base, mixins.Logged):
    def run(self):
        return 1

    def stop(self):
        pass

def main():
    pass
"#;

        let record = extract(code);
        assert_eq!(record.strategy, Some(ExtractionStrategy::Grammar));
        assert_eq!(record.imports, vec!["import os", "from typing import List"]);

        assert_eq!(record.classes.len(), 2);
        let base = &record.classes[0];
        assert_eq!(base.name, "Base");
        assert!(base.bases.is_empty());
        assert_eq!((base.line_start, base.line_end), (4, 6));
        assert_eq!(base.methods, vec![FunctionInfo::new("run", 5, 6)]);

        let derived = &record.classes[1];
        assert_eq!(derived.bases, vec!["Base"]);
        let names: Vec<_> = derived.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["run", "stop"]);

        assert_eq!(record.functions, vec![FunctionInfo::new("main", 15, 16)]);
    }

    #[test]
    fn test_methods_are_not_reported_as_functions() {
        let code = "class A:\n    def m(self):\n        pass\n";
        let record = extract(code);
        assert!(record.functions.is_empty());
        assert_eq!(record.classes[0].methods.len(), 1);
    }

    #[test]
    fn test_decorated_method_belongs_to_class() {
        let code = r#"class A:
    @property
    def value(self):
        return 1

@cache
def helper():
    pass
"#;
        let record = extract(code);
        assert_eq!(record.classes[0].methods[0].name, "value");
        assert_eq!(record.functions.len(), 1);
        assert_eq!(record.functions[0].name, "helper");
    }

    #[test]
    fn test_nested_class_methods_stay_with_inner_class() {
        let code = r#"class Outer:
    class Inner:
        def deep(self):
            pass

    def shallow(self):
        pass
"#;
        let record = extract(code);
        assert_eq!(record.classes.len(), 2);
        assert_eq!(record.classes[0].name, "Outer");
        assert_eq!(record.classes[0].methods[0].name, "shallow");
        assert_eq!(record.classes[1].name, "Inner");
        assert_eq!(record.classes[1].methods[0].name, "deep");
    }

    #[test]
    fn test_nested_function_is_not_a_method() {
        let code = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let record = extract(code);
        let names: Vec<_> = record.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
    }

    #[test]
    fn test_syntax_errors_do_not_abort() {
        let code = "class Broken(:\n    pass\n\ndef ok():\n    pass\n";
        let record = extract(code);
        let found = record.functions.iter().any(|f| f.name == "ok")
            || record
                .classes
                .iter()
                .any(|c| c.methods.iter().any(|m| m.name == "ok"));
        assert!(found, "recovered tree should still expose `ok`: {record:?}");
    }
}
