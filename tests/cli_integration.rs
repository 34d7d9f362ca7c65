//! CLI integration tests for programme
//!
//! These tests run the binary against snapshot files in temporary
//! directories and check both text and JSON output.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command instance for the programme binary
fn programme_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("programme"));
    cmd.env_remove("PROGRAMME_LIBRARY").env_remove("RUST_LOG");
    cmd
}

/// Writes a snapshot file into a fresh temporary directory
fn write_snapshot(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

const CHAIN: &str = r#"[
  {"id": "A", "name": "Slab", "planned_start": "2025-01-01", "planned_end": "2025-01-06"},
  {"id": "B", "name": "Frame", "planned_start": "2025-01-06", "planned_end": "2025-01-09", "dependencies": ["A"]}
]"#;

const CONFLICTED: &str = r#"[
  {"id": "C", "name": "Loop", "dependencies": ["C"]},
  {"id": "D", "name": "Stairs", "trade": "carpentry", "planned_start": "2025-01-01", "planned_end": "2025-01-05"},
  {"id": "E", "name": "Doors", "trade": "carpentry", "planned_start": "2025-01-03", "planned_end": "2025-01-08"},
  {"id": "G", "name": "Pour", "planned_start": "2025-01-01", "planned_end": "2025-01-10"},
  {"id": "F", "name": "Strip forms", "planned_start": "2025-01-05", "planned_end": "2025-01-07", "dependencies": ["G"]}
]"#;

// =============================================================================
// Critical Path Tests
// =============================================================================

#[test]
fn test_critical_path_text() {
    let (_dir, path) = write_snapshot("chain.json", CHAIN);

    programme_cmd()
        .arg("critical-path")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Critical path (2 milestones, 8 days)"))
        .stdout(predicate::str::contains("Frame"));
}

#[test]
fn test_critical_path_json() {
    let (_dir, path) = write_snapshot("chain.json", CHAIN);

    let output = programme_cmd()
        .args(["--format", "json", "critical-path"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["path"], serde_json::json!(["A", "B"]));
    assert_eq!(json["duration"], 8);
}

#[test]
fn test_critical_path_from_jsonl() {
    let content = "{\"id\": 1, \"name\": \"One\"}\n{\"id\": 2, \"name\": \"Two\", \"dependencies\": [1]}\n";
    let (_dir, path) = write_snapshot("chain.jsonl", content);

    programme_cmd()
        .args(["-f", "json", "critical-path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\":[\"1\",\"2\"]"));
}

#[test]
fn test_critical_path_from_stdin() {
    programme_cmd()
        .args(["-f", "json", "critical-path", "-"])
        .write_stdin(CHAIN)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"duration\":8"));
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();

    programme_cmd()
        .arg("critical-path")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

// =============================================================================
// Conflict Tests
// =============================================================================

#[test]
fn test_conflicts_json() {
    let (_dir, path) = write_snapshot("site.json", CONFLICTED);

    let output = programme_cmd()
        .args(["--format", "json", "conflicts"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let issues: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let summary: Vec<(String, String)> = issues
        .iter()
        .map(|i| {
            (
                i["type"].as_str().unwrap().to_string(),
                i["severity"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("overlap".to_string(), "medium".to_string()),
            ("dependency_loop".to_string(), "critical".to_string()),
            ("impossible_timeline".to_string(), "high".to_string()),
        ]
    );
    assert_eq!(issues[0]["milestone_ids"], serde_json::json!(["D", "E"]));
    assert_eq!(issues[1]["milestone_ids"], serde_json::json!(["C"]));
    assert_eq!(issues[2]["milestone_ids"], serde_json::json!(["F", "G"]));
}

#[test]
fn test_conflicts_text_clean() {
    let (_dir, path) = write_snapshot("chain.json", CHAIN);

    programme_cmd()
        .arg("conflicts")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No conflicts found."));
}

#[test]
fn test_conflicts_strict_fails_on_blocking_issues() {
    let (_dir, path) = write_snapshot("site.json", CONFLICTED);

    programme_cmd()
        .args(["conflicts", "--strict"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("High or critical conflicts found"));
}

#[test]
fn test_conflicts_from_yaml() {
    let yaml = r#"
- id: D
  name: Stairs
  trade: Carpentry
  planned_start: 2025-01-01
  planned_end: 2025-01-05
- id: E
  name: Doors
  trade: carpentry
  planned_start: 2025-01-03
  planned_end: 2025-01-08
"#;
    let (_dir, path) = write_snapshot("site.yaml", yaml);

    programme_cmd()
        .arg("conflicts")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("overlap"));
}

// =============================================================================
// Analyze / Annotate Tests
// =============================================================================

#[test]
fn test_analyze_json() {
    let (_dir, path) = write_snapshot("site.json", CONFLICTED);

    let output = programme_cmd()
        .args(["-f", "json", "analyze"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["critical_path"]["path"].is_array());
    assert_eq!(json["conflicts"].as_array().unwrap().len(), 3);
}

#[test]
fn test_annotate_sets_flags() {
    let (_dir, path) = write_snapshot("chain.json", CHAIN);

    let output = programme_cmd().arg("annotate").arg(&path).output().unwrap();
    assert!(output.status.success());

    let milestones: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(milestones.len(), 2);
    assert!(milestones.iter().all(|m| m["critical_path_flag"] == true));
}

// =============================================================================
// Suggestion Tests
// =============================================================================

const EXISTING: &str = r#"[
  {"id": "m1", "name": "Bulk excavation", "trade": "excavation"},
  {"id": "m2", "name": "Slab pour", "trade": "concrete"},
  {"id": "m3", "name": "Plasterboard level 1"}
]"#;

#[test]
fn test_suggest_for_new_milestone() {
    let (_dir, path) = write_snapshot("site.json", EXISTING);

    let output = programme_cmd()
        .args(["-f", "json", "suggest"])
        .arg(&path)
        .args(["--name", "Footings", "--trade", "concrete"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dependencies"], serde_json::json!(["m1"]));
}

#[test]
fn test_suggest_for_existing_milestone() {
    let (_dir, path) = write_snapshot("site.json", EXISTING);

    programme_cmd()
        .arg("suggest")
        .arg(&path)
        .args(["--milestone", "m2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested dependencies for 'Slab pour'"))
        .stdout(predicate::str::contains("m1"));
}

#[test]
fn test_suggest_unknown_milestone_fails() {
    let (_dir, path) = write_snapshot("site.json", EXISTING);

    programme_cmd()
        .arg("suggest")
        .arg(&path)
        .args(["--milestone", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Milestone not found"));
}

#[test]
fn test_suggest_requires_name_or_milestone() {
    let (_dir, path) = write_snapshot("site.json", EXISTING);

    programme_cmd().arg("suggest").arg(&path).assert().failure();
}

// =============================================================================
// Template / Generation Tests
// =============================================================================

#[test]
fn test_generate_residential_json() {
    let dir = TempDir::new().unwrap();

    let output = programme_cmd()
        .current_dir(dir.path())
        .args(["-f", "json", "generate", "--start", "2025-01-01", "--type", "residential"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let drafts: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let site = drafts
        .iter()
        .find(|d| d["template_id"] == "site_establishment")
        .unwrap();
    assert_eq!(site["planned_start"], "2025-01-01");
    assert_eq!(site["planned_end"], "2025-01-06");

    let excavation = drafts
        .iter()
        .find(|d| d["template_id"] == "excavation")
        .unwrap();
    assert_eq!(excavation["planned_start"], "2025-01-07");
    assert_eq!(excavation["dependencies"], serde_json::json!([site["id"].clone()]));

    assert!(drafts.iter().all(|d| d["template_id"] != "plant_commissioning"));
}

#[test]
fn test_generate_uses_project_config() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".programme")).unwrap();
    fs::write(
        dir.path().join(".programme/config.toml"),
        "project_type = \"industrial\"\n",
    )
    .unwrap();

    programme_cmd()
        .current_dir(dir.path())
        .args(["generate", "--start", "2025-03-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft industrial programme"))
        .stdout(predicate::str::contains("Plant & Equipment Commissioning"));
}

#[test]
fn test_generate_rejects_bad_date() {
    programme_cmd()
        .args(["generate", "--start", "next tuesday"])
        .assert()
        .failure();
}

const CUSTOM_LIBRARY: &str = r#"
templates:
  - id: strip_out
    name: Strip Out
    trade: demolition
    estimated_duration_days: 4
  - id: refit
    name: Office Refit
    trade: carpentry
    estimated_duration_days: 10
    dependencies: [strip_out]
"#;

#[test]
fn test_generate_with_custom_library() {
    let (dir, library) = write_snapshot("fitout.yaml", CUSTOM_LIBRARY);

    programme_cmd()
        .current_dir(dir.path())
        .arg("--library")
        .arg(&library)
        .args(["generate", "--start", "2025-01-01", "--type", "commercial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strip Out"))
        .stdout(predicate::str::contains("Office Refit"))
        .stdout(predicate::str::contains("2025-01-06"));
}

#[test]
fn test_templates_list() {
    programme_cmd()
        .args(["templates", "list", "--type", "industrial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plant_commissioning"))
        .stdout(predicate::str::contains("landscaping").not());
}

#[test]
fn test_templates_check_valid() {
    let (_dir, library) = write_snapshot("fitout.yaml", CUSTOM_LIBRARY);

    programme_cmd()
        .args(["templates", "check"])
        .arg(&library)
        .assert()
        .success()
        .stdout(predicate::str::contains("Template library is valid"));
}

#[test]
fn test_templates_check_ignores_broken_configured_library() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".programme")).unwrap();
    fs::write(dir.path().join("broken.yaml"), "- id: [not a template\n").unwrap();
    fs::write(
        dir.path().join(".programme/config.toml"),
        "template_library = \"broken.yaml\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("fitout.yaml"), CUSTOM_LIBRARY).unwrap();

    programme_cmd()
        .current_dir(dir.path())
        .args(["templates", "check", "fitout.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template library is valid"));

    programme_cmd()
        .current_dir(dir.path())
        .args(["templates", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yaml"));
}

#[test]
fn test_templates_check_rejects_cycle() {
    let cyclic = r#"
- id: a
  name: A
  estimated_duration_days: 1
  dependencies: [b]
- id: b
  name: B
  estimated_duration_days: 1
  dependencies: [a]
"#;
    let (_dir, library) = write_snapshot("cyclic.yaml", cyclic);

    programme_cmd()
        .args(["templates", "check"])
        .arg(&library)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

// =============================================================================
// Global Flag Tests
// =============================================================================

#[test]
fn test_verbose_writes_context_to_stderr() {
    let (_dir, path) = write_snapshot("chain.json", CHAIN);

    programme_cmd()
        .args(["--verbose", "critical-path"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:critical-path]"));
}

#[test]
fn test_version() {
    programme_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("programme"));
}
