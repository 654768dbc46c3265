use ccg_extractor::{ExtractionStrategy, StructuralExtractor};
use std::fs;
use tempfile::tempdir;

#[test]
fn batch_preserves_input_order_and_isolates_failures() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("b.py"), "class B:\n    pass\n").unwrap();
    fs::write(root.join("a.py"), "def a():\n    return 1\n").unwrap();
    fs::write(root.join("notes.txt"), "not code").unwrap();

    let paths = vec![
        root.join("b.py"),
        root.join("missing.py"),
        root.join("notes.txt"),
        root.join("a.py"),
    ];

    let extractor = StructuralExtractor::default();
    let records = extractor.extract_batch(&paths);

    let modules: Vec<_> = records.iter().map(|r| r.module_name.as_str()).collect();
    assert_eq!(modules, vec!["b", "missing", "notes.txt", "a"]);

    assert!(!records[0].is_error());
    assert_eq!(records[0].classes[0].name, "B");
    assert!(records[1].is_error());
    assert!(records[2].is_error());
    assert_eq!(records[3].functions[0].name, "a");
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("latin.py");
    let mut bytes = b"# caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"\ndef brew():\n    pass\n");
    fs::write(&path, bytes).unwrap();

    let record = StructuralExtractor::default().extract(&path);
    assert!(!record.is_error(), "unexpected error: {:?}", record.error);
    assert_eq!(record.strategy, Some(ExtractionStrategy::Grammar));
    assert_eq!(record.functions[0].name, "brew");
    assert_eq!(record.functions[0].line_start, 2);
}

#[test]
fn record_serializes_to_plain_json() {
    let extractor = StructuralExtractor::default();
    let record = extractor.extract_source(
        "pkg/models.py",
        "from base import Model\n\nclass User(Model):\n    def save(self):\n        pass\n",
    );

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["module_name"], "models");
    assert_eq!(value["imports"][0], "from base import Model");
    assert_eq!(value["classes"][0]["bases"][0], "Model");
    assert_eq!(value["classes"][0]["methods"][0]["name"], "save");
    assert!(value.get("error").is_none());
}
