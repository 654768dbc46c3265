use crate::error::{GraphError, Result};
use crate::resolver::NameResolver;
use crate::types::*;
use ccg_extractor::StructuralRecord;
use serde::Serialize;
use serde_json::Value;

/// Counts from one `ingest` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub modules: usize,
    pub classes: usize,
    pub functions: usize,
    /// Records dropped in pass 1: (file_path, error)
    pub skipped: Vec<(String, String)>,
    /// Declared bases with no class node at wiring time
    pub unresolved_bases: usize,
    /// Raw import statements left unlinked (no cross-file resolution)
    pub unresolved_imports: usize,
}

/// Builds a code context graph.
///
/// The builder exclusively owns the graph while it is being assembled;
/// [`finish`](Self::finish) hands back the frozen, read-only graph.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: CodeGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the graph under construction
    pub fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    /// Stop building and return the graph
    pub fn finish(self) -> CodeGraph {
        log::info!(
            "Built code context graph: {} nodes, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.graph
    }

    /// Always creates a new module node, even for a path seen before
    pub fn add_module(&mut self, file_path: &str, name: &str) -> NodeId {
        self.graph.add_node(
            name,
            NodeProperties::Module {
                file_path: file_path.to_string(),
            },
        )
    }

    /// Detached file node
    pub fn add_file(&mut self, file_path: &str) -> NodeId {
        let name = std::path::Path::new(file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_path);
        self.graph.add_node(
            name,
            NodeProperties::File {
                file_path: file_path.to_string(),
            },
        )
    }

    /// Create a class under `module_id` and wire inheritance against the
    /// classes that exist right now. Bases with no match are dropped.
    pub fn add_class(
        &mut self,
        module_id: NodeId,
        name: &str,
        bases: &[String],
        span: Option<LineSpan>,
    ) -> NodeId {
        self.add_class_counting(module_id, name, bases, span).0
    }

    fn add_class_counting(
        &mut self,
        module_id: NodeId,
        name: &str,
        bases: &[String],
        span: Option<LineSpan>,
    ) -> (NodeId, usize) {
        let class_id = self.graph.add_node(
            name,
            NodeProperties::Class {
                bases: bases.to_vec(),
                span,
            },
        );
        self.graph.link(module_id, class_id, EdgeKind::Contains);

        let mut unresolved = 0;
        for base in bases {
            let base_match = NameResolver::new(&self.graph).resolve(base, Some(NodeKind::Class));
            match base_match {
                Some(base_id) => {
                    self.graph.link(class_id, base_id, EdgeKind::InheritsFrom);
                }
                None => {
                    log::debug!("class `{name}`: base `{base}` not in graph, dropped");
                    unresolved += 1;
                }
            }
        }

        (class_id, unresolved)
    }

    /// Create a function; detached when `parent_id` does not exist
    pub fn add_function(
        &mut self,
        parent_id: NodeId,
        name: &str,
        parent_kind: ParentKind,
        span: Option<LineSpan>,
    ) -> NodeId {
        let function_id = self
            .graph
            .add_node(name, NodeProperties::Function { parent_kind, span });
        self.graph.link(parent_id, function_id, EdgeKind::Contains);
        function_id
    }

    /// calls/called_by pair; no-op unless both nodes exist
    pub fn add_call_relationship(&mut self, caller_id: NodeId, callee_id: NodeId) -> bool {
        self.graph.link(caller_id, callee_id, EdgeKind::Calls)
    }

    /// imports/imported_by pair; no-op unless both nodes exist
    pub fn add_import_relationship(&mut self, importer_id: NodeId, imported_id: NodeId) -> bool {
        self.graph.link(importer_id, imported_id, EdgeKind::Imports)
    }

    /// Attach source-specific metadata to a node
    pub fn set_extra(&mut self, id: NodeId, key: &str, value: Value) -> Result<()> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(format!("{id:?}")))?;
        node.insert_extra(key, value)
    }

    /// Assemble the graph from records in three passes.
    ///
    /// Record order is part of the contract: inheritance only resolves
    /// against classes created earlier in the sequence.
    pub fn ingest(&mut self, records: &[StructuralRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        // Pass 1: one module per usable record
        let mut modules: Vec<Option<NodeId>> = Vec::with_capacity(records.len());
        for record in records {
            if let Some(error) = &record.error {
                log::warn!("Skipping {}: {error}", record.file_path);
                report
                    .skipped
                    .push((record.file_path.clone(), error.clone()));
                modules.push(None);
                continue;
            }

            let module_id = self.add_module(&record.file_path, &record.module_name);
            if let Some(strategy) = record.strategy {
                if let Err(e) =
                    self.set_extra(module_id, "extraction", Value::from(strategy.as_str()))
                {
                    log::debug!("{}: {e}", record.file_path);
                }
            }
            let declared = [
                ("walkers", &record.walkers),
                ("node_types", &record.node_types),
            ];
            for (key, declarations) in declared {
                if declarations.is_empty() {
                    continue;
                }
                let names: Vec<Value> = declarations
                    .iter()
                    .map(|d| Value::from(d.name.as_str()))
                    .collect();
                if let Err(e) = self.set_extra(module_id, key, Value::Array(names)) {
                    log::debug!("{}: {e}", record.file_path);
                }
            }
            modules.push(Some(module_id));
            report.modules += 1;
        }

        // Pass 2: classes (+ inheritance), methods, then top-level functions
        for (record, module_id) in records.iter().zip(&modules) {
            let Some(module_id) = *module_id else {
                continue;
            };

            for class in &record.classes {
                let (class_id, unresolved) = self.add_class_counting(
                    module_id,
                    &class.name,
                    &class.bases,
                    Some(LineSpan::new(class.line_start, class.line_end)),
                );
                report.classes += 1;
                report.unresolved_bases += unresolved;

                for method in &class.methods {
                    self.add_function(
                        class_id,
                        &method.name,
                        ParentKind::Class,
                        Some(LineSpan::new(method.line_start, method.line_end)),
                    );
                    report.functions += 1;
                }
            }

            for function in &record.functions {
                self.add_function(
                    module_id,
                    &function.name,
                    ParentKind::Module,
                    Some(LineSpan::new(function.line_start, function.line_end)),
                );
                report.functions += 1;
            }

            log::debug!(
                "{}: {} classes, {} functions",
                record.file_path,
                record.classes.len(),
                record.functions.len() + record.method_count()
            );
        }

        // Pass 3: cross-file call/import resolution is not performed. Call
        // and import edges only come from add_call_relationship and
        // add_import_relationship.
        report.unresolved_imports = records
            .iter()
            .filter(|r| !r.is_error())
            .map(|r| r.imports.len())
            .sum();

        log::info!(
            "Ingested {} records: {} modules, {} classes, {} functions, {} skipped",
            records.len(),
            report.modules,
            report.classes,
            report.functions,
            report.skipped.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccg_extractor::{ClassInfo, DeclarationInfo, ExtractionStrategy, FunctionInfo};
    use pretty_assertions::assert_eq;

    fn record(path: &str, classes: Vec<ClassInfo>, functions: Vec<FunctionInfo>) -> StructuralRecord {
        let module = path.trim_end_matches(".py");
        let mut record = StructuralRecord::new(path, module, ExtractionStrategy::Grammar);
        record.classes = classes;
        record.functions = functions;
        record
    }

    #[test]
    fn test_add_class_wires_module_and_base() {
        let mut builder = GraphBuilder::new();
        let m = builder.add_module("shapes.py", "shapes");
        let base = builder.add_class(m, "Shape", &[], None);
        let derived = builder.add_class(m, "Circle", &["Shape".to_string()], None);

        let graph = builder.graph();
        assert_eq!(
            graph.edges_of(m),
            vec![(base, EdgeKind::Contains), (derived, EdgeKind::Contains)]
        );
        assert_eq!(
            graph.edges_of(derived),
            vec![(m, EdgeKind::BelongsTo), (base, EdgeKind::InheritsFrom)]
        );
        assert_eq!(
            graph.edges_of(base),
            vec![(m, EdgeKind::BelongsTo), (derived, EdgeKind::InheritedBy)]
        );
    }

    #[test]
    fn test_unknown_parent_creates_detached_nodes() {
        let mut builder = GraphBuilder::new();
        let ghost = NodeId::new(5);

        let f = builder.add_function(ghost, "orphan", ParentKind::Module, None);
        let c = builder.add_class(ghost, "Orphan", &["Nope".into()], None);
        assert_eq!(builder.graph().node_count(), 2);
        assert!(builder.graph().edges_of(f).is_empty());
        assert!(builder.graph().edges_of(c).is_empty());
    }

    #[test]
    fn test_add_module_does_not_deduplicate() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_module("a.py", "a");
        let b = builder.add_module("a.py", "a");
        assert_ne!(a, b);
        assert_eq!(builder.graph().node_count(), 2);
    }

    #[test]
    fn test_relationships_require_both_endpoints() {
        let mut builder = GraphBuilder::new();
        let m = builder.add_module("a.py", "a");
        let f = builder.add_function(m, "f", ParentKind::Module, None);
        let missing = NodeId::new(99);

        assert!(!builder.add_call_relationship(f, missing));
        assert!(!builder.add_import_relationship(missing, m));
        assert!(builder.add_call_relationship(f, f));
        assert!(!builder.add_call_relationship(f, f));

        assert_eq!(
            builder.graph().edges_of(f),
            vec![
                (m, EdgeKind::BelongsTo),
                (f, EdgeKind::Calls),
                (f, EdgeKind::CalledBy)
            ]
        );
    }

    #[test]
    fn test_ingest_orders_passes() {
        let r1 = record(
            "a.py",
            vec![ClassInfo::new("A", 1, 4).with_method(FunctionInfo::new("m", 2, 4))],
            vec![FunctionInfo::new("helper", 6, 7)],
        );
        let r2 = record("b.py", vec![], vec![FunctionInfo::new("main", 1, 2)]);

        let mut builder = GraphBuilder::new();
        let report = builder.ingest(&[r1, r2]);
        let graph = builder.finish();

        let keys: Vec<_> = graph.nodes().map(|n| (n.key(), n.name().to_string())).collect();
        assert_eq!(
            keys,
            vec![
                ("module_1".to_string(), "a".to_string()),
                ("module_2".to_string(), "b".to_string()),
                ("class_3".to_string(), "A".to_string()),
                ("function_4".to_string(), "m".to_string()),
                ("function_5".to_string(), "helper".to_string()),
                ("function_6".to_string(), "main".to_string()),
            ]
        );
        assert_eq!(report.modules, 2);
        assert_eq!(report.classes, 1);
        assert_eq!(report.functions, 3);

        let method = graph.resolve_key("function_4").unwrap();
        assert_eq!(
            graph.get_node(method).unwrap().properties(),
            &NodeProperties::Function {
                parent_kind: ParentKind::Class,
                span: Some(LineSpan::new(2, 4)),
            }
        );
    }

    #[test]
    fn test_ingest_skips_error_records() {
        let good = record("ok.py", vec![ClassInfo::new("Ok", 1, 1)], vec![]);
        let mut bad = StructuralRecord::failed("bad.py", "bad", "IO error: denied");
        bad.classes.push(ClassInfo::new("Ghost", 1, 1));

        let mut builder = GraphBuilder::new();
        let report = builder.ingest(&[bad, good]);

        assert_eq!(report.modules, 1);
        assert_eq!(
            report.skipped,
            vec![("bad.py".to_string(), "IO error: denied".to_string())]
        );
        assert!(builder.graph().find_node_by_name("Ghost", None).is_none());
        assert_eq!(builder.graph().node_count(), 2);
    }

    #[test]
    fn test_ingest_tags_extraction_strategy() {
        let mut degraded = record("d.py", vec![], vec![]);
        degraded.strategy = Some(ExtractionStrategy::LineHeuristic);

        let mut builder = GraphBuilder::new();
        builder.ingest(&[degraded]);
        let graph = builder.finish();
        let module = graph.nodes().next().unwrap();
        assert_eq!(module.extra()["extraction"], "line_heuristic");
    }

    #[test]
    fn test_jac_module_keeps_declarations() {
        let mut jac = StructuralRecord::new("app/social.jac", "social", ExtractionStrategy::JacPatterns);
        jac.walkers = vec![DeclarationInfo::new("greet", 3), DeclarationInfo::new("visit", 9)];
        jac.node_types = vec![DeclarationInfo::new("person", 1)];

        let mut builder = GraphBuilder::new();
        let report = builder.ingest(&[jac]);
        let graph = builder.finish();

        assert_eq!(report.modules, 1);
        let module = graph.nodes().next().unwrap();
        assert_eq!(module.kind(), NodeKind::Module);
        assert_eq!(module.extra()["extraction"], "jac_patterns");
        assert_eq!(module.extra()["walkers"], serde_json::json!(["greet", "visit"]));
        assert_eq!(module.extra()["node_types"], serde_json::json!(["person"]));
    }

    #[test]
    fn test_report_counts_unresolved() {
        let mut r = record(
            "a.py",
            vec![ClassInfo::new("A", 1, 1).with_bases(["object", "Mixin"])],
            vec![],
        );
        r.imports = vec!["import os".into(), "import sys".into()];

        let mut builder = GraphBuilder::new();
        let report = builder.ingest(&[r]);
        assert_eq!(report.unresolved_bases, 2);
        assert_eq!(report.unresolved_imports, 2);
    }

    #[test]
    fn test_set_extra_on_missing_node() {
        let mut builder = GraphBuilder::new();
        assert!(builder
            .set_extra(NodeId::new(0), "language", Value::from("python"))
            .is_err());
    }
}
