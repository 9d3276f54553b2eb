use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn repochunk() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repochunk"))
}

fn setup_repo() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::write(
        root.join("src/lib.rs"),
        "use std::fmt;\n\npub fn greet(name: &str) -> String {\n    format!(\"hi {name}\")\n}\n",
    )
    .unwrap();
    fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1;\n").unwrap();
    fs::write(root.join("notes.xyz"), "free text\n").unwrap();
    temp
}

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn chunk_streams_jsonl_to_stdout() {
    let temp = setup_repo();
    let output = repochunk()
        .args(["--quiet", "chunk"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = parse_jsonl(&output.stdout);
    let summary: Vec<_> = records
        .iter()
        .map(|r| {
            (
                r["filepath"].as_str().unwrap().to_string(),
                r["start_line_no"].as_u64().unwrap(),
                r["end_line_no"].as_u64().unwrap(),
                r["language"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("notes.xyz".to_string(), 1, 1, "text".to_string()),
            ("src/lib.rs".to_string(), 1, 2, "rust".to_string()),
            ("src/lib.rs".to_string(), 3, 5, "rust".to_string()),
        ]
    );
    assert!(records[0]["node_count"].is_null());
    assert!(records[2]["node_count"].as_u64().unwrap() > 0);
    assert_eq!(records[2]["file_name"], "lib.rs");
}

#[test]
fn chunk_writes_json_array_to_file() {
    let temp = setup_repo();
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("chunks.json");

    repochunk()
        .args(["-q", "chunk", "--format", "json", "--parallel", "--output"])
        .arg(&out)
        .arg(temp.path())
        .assert()
        .success();

    let value: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 3);
}

#[test]
fn window_overrides_apply() {
    let temp = tempdir().unwrap();
    let body: String = (1..=250).map(|i| format!("line {i}\n")).collect();
    fs::write(temp.path().join("long.txt"), body).unwrap();

    let output = repochunk()
        .args(["-q", "chunk", "--window-size", "50", "--overlap-size", "10"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let starts: Vec<_> = parse_jsonl(&output.stdout)
        .iter()
        .map(|r| r["start_line_no"].as_u64().unwrap())
        .collect();
    assert_eq!(starts, vec![1, 41, 81, 121, 161, 201]);
}

#[test]
fn invalid_overlap_fails_before_walking() {
    let temp = setup_repo();
    repochunk()
        .args(["chunk", "--window-size", "10", "--overlap-size", "10"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("overlap_size"));
}

#[test]
fn unknown_config_key_fails() {
    let temp = setup_repo();
    let config = temp.path().join("repochunk.yaml");
    fs::write(&config, "chunk_size: 10\n").unwrap();

    repochunk()
        .args(["chunk", "--config"])
        .arg(&config)
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to load configuration"));
}

#[test]
fn missing_root_fails() {
    let temp = tempdir().unwrap();
    repochunk()
        .arg("chunk")
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid repository path"));
}

#[test]
fn files_lists_language_and_strategy() {
    let temp = setup_repo();
    repochunk()
        .args(["-q", "files"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout("notes.xyz\ttext\twindow\nsrc/lib.rs\trust\tstructural\n");
}

#[test]
fn files_sniffs_shebang_scripts() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("tool"),
        "#!/usr/bin/env python3\n\ndef main():\n    pass\n",
    )
    .unwrap();

    repochunk()
        .args(["-q", "files"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout("tool\tpython\tstructural\n");
}

#[test]
fn config_prints_default_yaml_that_loads_back() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("default.yaml");

    repochunk()
        .arg("config")
        .assert()
        .success()
        .stdout(predicates::str::contains("window_size: 100"));

    repochunk()
        .args(["config", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(Path::new(&path).exists());

    let repo = setup_repo();
    repochunk()
        .args(["-q", "files", "--config"])
        .arg(&path)
        .arg(repo.path())
        .assert()
        .success();
}
