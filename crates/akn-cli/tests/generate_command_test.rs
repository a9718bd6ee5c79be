use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn cargo_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_akn-profiler"))
}

fn run(args: &[&str]) -> Output {
    Command::new(cargo_bin())
        .args(args)
        .output()
        .expect("akn-profiler should execute")
}

#[test]
fn test_generate_to_stdout() {
    let output = run(&["generate", "act"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Auto-generated AKN Application Profile"));
    assert!(stdout.contains("  documentTypes:\n    - act\n"));
}

#[test]
fn test_generate_without_comments_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bill.yaml");
    let output = run(&[
        "generate",
        "bill",
        "--no-comments",
        "--all-attributes",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains('#'));
    assert!(text.contains("        lang:\n          required: false\n"), "{}", text);
}

#[test]
fn test_generated_profile_passes_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("act.yaml");
    assert!(run(&["generate", "act", "-o", path.to_str().unwrap()]).status.success());

    let output = run(&["validate", path.to_str().unwrap(), "--format", "json"]);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rule_ids: Vec<&str> = report["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["ruleId"].as_str())
        .collect();
    assert!(
        rule_ids.iter().all(|id| *id == "choice.required-group-empty"),
        "{:?}",
        rule_ids
    );
}

#[test]
fn test_generate_unknown_document_type() {
    let output = run(&["generate", "notADocType"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'notADocType' is not a valid document type"), "{}", stderr);
}

#[test]
fn test_doc_types_and_elements() {
    let output = run(&["doc-types"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "act\nbill\ndoc\ndebate\ncomponents\n"
    );

    let output = run(&["elements"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert!(names.contains(&"akomaNtoso"));
    assert!(names.contains(&"FRBRWork"));
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}
