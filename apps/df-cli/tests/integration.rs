//! Integration tests for df-cli: sketches and configs read from disk.

use std::path::PathBuf;

use df_cli::{GraphReport, Sketch, SketchError};
use df_editor::EditorConfig;
use tempfile::TempDir;

/// Write `content` to `name` inside `dir`.
fn scratch(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const DIAMOND: &str = r#"
nodes:
  - { name: src, expression: "t * 2" }
  - { name: left, expression: "u + 1" }
  - { name: right, expression: "v - 1" }
  - { name: sink, expression: "l * r" }
links:
  - { from: src, to: left.u }
  - { from: src, to: right.v }
  - { from: left, to: sink.l }
  - { from: right, to: sink.r }
"#;

#[test]
fn diamond_sketch_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = scratch(&dir, "diamond.yaml", DIAMOND);
    let store = Sketch::load(&path)
        .unwrap()
        .build(&EditorConfig::default())
        .unwrap();
    let sink = store.node_by_name("sink").unwrap();
    let script = store.build_script(sink).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "src = t * 2");
    assert_eq!(lines[3], "sink = left * right");

    let report = GraphReport::of(&store).unwrap();
    assert_eq!(report.links, 4);
    assert_eq!(report.nodes[0].fan_out, 2);

    let root = dir.path().to_path_buf();
    dir.close().unwrap();
    assert!(!root.exists());
}

#[test]
fn config_file_renames_outlets() {
    let dir = TempDir::new().unwrap();
    let config_path = scratch(&dir, "config.yaml", "default_outlet: value\n");
    let config = EditorConfig::load(&config_path).unwrap();
    let store = Sketch::from_yaml_str(DIAMOND).unwrap().build(&config).unwrap();
    let report = GraphReport::of(&store).unwrap();
    assert!(report.nodes.iter().all(|n| n.outlets == ["value"]));
}

#[test]
fn missing_sketch_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.yaml");
    assert!(matches!(Sketch::load(&path), Err(SketchError::Io(_))));
}
