use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn ccg(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ccg").expect("binary");
    cmd.current_dir(workdir).arg("--quiet");
    cmd
}

fn run_json(workdir: &Path, args: &[&str]) -> Value {
    let output = ccg(workdir).args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_repo() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("base.py"),
        "class Base:\n    def run(self):\n        pass\n",
    )
    .unwrap();
    fs::write(
        root.join("derived.py"),
        "from base import Base\n\nclass Derived(Base):\n    def run(self):\n        pass\n\ndef main():\n    Derived().run()\n",
    )
    .unwrap();
    temp
}

#[test]
fn extract_prints_record() {
    let temp = setup_repo();
    let record = run_json(temp.path(), &["extract", "derived.py"]);

    assert_eq!(record["module_name"], "derived");
    assert_eq!(record["strategy"], "grammar");
    assert_eq!(record["classes"][0]["bases"][0], "Base");
    assert_eq!(record["functions"][0]["name"], "main");
}

#[test]
fn build_respects_file_order() {
    let temp = setup_repo();

    let forward = run_json(temp.path(), &["build", "base.py", "derived.py"]);
    assert_eq!(forward["node_count"], 7);
    assert_eq!(forward["nodes"]["class_3"]["name"], "Base");
    assert_eq!(
        forward["nodes"]["class_5"]["edges"],
        serde_json::json!([
            ["module_2", "belongs_to"],
            ["class_3", "inherits_from"],
            ["function_6", "contains"]
        ])
    );

    let reversed = run_json(temp.path(), &["build", "derived.py", "base.py"]);
    assert_eq!(reversed["nodes"]["class_3"]["name"], "Derived");
    assert_eq!(
        reversed["nodes"]["class_3"]["edges"],
        serde_json::json!([["module_1", "belongs_to"], ["function_4", "contains"]])
    );
}

#[test]
fn query_reads_snapshot() {
    let temp = setup_repo();
    let root = temp.path();

    ccg(root)
        .args(["build", "base.py", "derived.py", "missing.py", "-o", "graph.json"])
        .assert()
        .success();
    assert!(root.join("graph.json").exists());

    let subclasses = run_json(root, &["query", "--graph", "graph.json", "subclasses", "Base"]);
    assert_eq!(subclasses, serde_json::json!(["Derived"]));

    let classes = run_json(root, &["query", "--graph", "graph.json", "type", "class"]);
    assert_eq!(classes, serde_json::json!(["class_3", "class_5"]));

    let edges = run_json(
        root,
        &[
            "query",
            "--graph",
            "graph.json",
            "relationships",
            "module_1",
            "--kind",
            "contains",
        ],
    );
    assert_eq!(edges, serde_json::json!([["class_3", "contains"]]));

    // no call edges are inferred from source
    let callers = run_json(root, &["query", "--graph", "graph.json", "callers", "run"]);
    assert_eq!(callers, serde_json::json!([]));

    let node = run_json(root, &["query", "--graph", "graph.json", "node", "module_2"]);
    assert_eq!(node["properties"]["file_path"], "derived.py");
}

#[test]
fn query_unknown_node_fails() {
    let temp = setup_repo();
    let root = temp.path();
    ccg(root)
        .args(["build", "base.py", "-o", "graph.json"])
        .assert()
        .success();

    ccg(root)
        .args(["query", "--graph", "graph.json", "node", "class_42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown node id class_42"));
}

#[test]
fn config_selects_degraded_mode() {
    let temp = setup_repo();
    let root = temp.path();
    fs::write(
        root.join("ccg.toml"),
        "[extractor]\nstrategy = \"line_heuristic\"\n",
    )
    .unwrap();

    let record = run_json(root, &["--config", "ccg.toml", "extract", "base.py"]);
    assert_eq!(record["strategy"], "line_heuristic");
    assert_eq!(record["classes"][0]["methods"][0]["name"], "run");
}
