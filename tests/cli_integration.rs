//! Integration tests for the `dl` CLI.
//!
//! Each test points `dl` at a fresh temp data directory (and an empty config
//! home), runs it as a subprocess, and checks stdout and/or the slot files.

use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Run `dl` against `data_dir`, returning (stdout, stderr, success).
fn run_dl(data_dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_dl"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env("XDG_CONFIG_HOME", data_dir.join("config-home"))
        .env_remove("DAYLIST_LOG")
        .output()
        .expect("failed to run dl");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dl` expecting success, return stdout.
fn run_dl_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_dl(data_dir, args);
    if !success {
        panic!(
            "dl {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn add(data_dir: &Path, text: &str, date: &str) -> String {
    run_dl_ok(data_dir, &["add", text, "--date", date])
        .trim()
        .to_string()
}

fn list_json(data_dir: &Path, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["list", "--json"];
    args.extend_from_slice(extra);
    serde_json::from_str(&run_dl_ok(data_dir, &args)).unwrap()
}

fn listed_texts(data_dir: &Path, extra: &[&str]) -> Vec<String> {
    list_json(data_dir, extra)["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Add / list
// ---------------------------------------------------------------------------

#[test]
fn test_add_to_empty_list() {
    let tmp = TempDir::new().unwrap();
    let out = run_dl_ok(tmp.path(), &["add", "Buy milk", "--date", "2024-03-01", "--json"]);
    let task: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(task["text"], "Buy milk");
    assert_eq!(task["order"], 1);
    assert_eq!(task["done"], false);
    assert_eq!(task["date"], "2024-03-01");
    assert!(tmp.path().join("tasks_v2.json").exists());
}

#[test]
fn test_add_blank_text_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_dl(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("task text is empty"));
    assert!(!tmp.path().join("tasks_v2.json").exists());
}

#[test]
fn test_add_rejects_bad_date() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_dl(tmp.path(), &["add", "x", "--date", "03/01/2024"]);
    assert!(!success);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_list_text_and_filter() {
    let tmp = TempDir::new().unwrap();
    let a = add(tmp.path(), "A", "2024-01-01");
    add(tmp.path(), "B", "2024-01-02");

    let out = run_dl_ok(tmp.path(), &["list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("[ ] {}  2024-01-01  A", a));

    assert_eq!(listed_texts(tmp.path(), &["--date", "2024-01-02"]), vec!["B"]);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["A", "B"]);
    assert_eq!(list_json(tmp.path(), &["--date", "2024-01-02"])["filter"], "2024-01-02");
}

#[test]
fn test_list_today_uses_default_date() {
    let tmp = TempDir::new().unwrap();
    run_dl_ok(tmp.path(), &["add", "undated means today"]);
    add(tmp.path(), "ancient", "1990-01-01");
    assert_eq!(
        listed_texts(tmp.path(), &["--today"]),
        vec!["undated means today"]
    );
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[test]
fn test_done_toggles() {
    let tmp = TempDir::new().unwrap();
    let id = add(tmp.path(), "Toggle me", "2024-01-01");
    assert_eq!(run_dl_ok(tmp.path(), &["done", &id]).trim(), format!("{} done", id));
    assert_eq!(run_dl_ok(tmp.path(), &["done", &id]).trim(), format!("{} todo", id));
}

#[test]
fn test_missing_id_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_dl(tmp.path(), &["rm", "nope"]);
    assert!(!success);
    assert!(stderr.contains("task not found: nope"));
}

#[test]
fn test_edit_and_blank_edit() {
    let tmp = TempDir::new().unwrap();
    let id = add(tmp.path(), "Draft", "2024-01-01");
    run_dl_ok(tmp.path(), &["edit", &id, "  Final  "]);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["Final"]);

    let (_, _, success) = run_dl(tmp.path(), &["edit", &id, "   "]);
    assert!(!success);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["Final"]);
}

#[test]
fn test_date_set_and_clear() {
    let tmp = TempDir::new().unwrap();
    let id = add(tmp.path(), "Movable", "2024-01-01");
    run_dl_ok(tmp.path(), &["date", &id, "2024-02-02"]);
    assert_eq!(list_json(tmp.path(), &[])["tasks"][0]["date"], "2024-02-02");
    run_dl_ok(tmp.path(), &["date", &id]);
    assert_eq!(list_json(tmp.path(), &[])["tasks"][0]["date"], "");
    assert!(run_dl_ok(tmp.path(), &["list"]).contains("no date"));
}

#[test]
fn test_rm() {
    let tmp = TempDir::new().unwrap();
    let id = add(tmp.path(), "Gone soon", "2024-01-01");
    add(tmp.path(), "Stays", "2024-01-01");
    run_dl_ok(tmp.path(), &["rm", &id]);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["Stays"]);
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn test_reorder_reproduces_sequence() {
    let tmp = TempDir::new().unwrap();
    let a = add(tmp.path(), "a", "2024-01-01");
    let b = add(tmp.path(), "b", "2024-01-01");
    let c = add(tmp.path(), "c", "2024-01-01");
    run_dl_ok(tmp.path(), &["reorder", &b, &a, &c]);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["b", "a", "c"]);
}

#[test]
fn test_reorder_under_filter_keeps_hidden_in_place() {
    let tmp = TempDir::new().unwrap();
    let a = add(tmp.path(), "a", "2024-01-01");
    add(tmp.path(), "h", "2024-05-05");
    let c = add(tmp.path(), "c", "2024-01-01");
    run_dl_ok(tmp.path(), &["reorder", "--date", "2024-01-01", &c, &a]);
    assert_eq!(listed_texts(tmp.path(), &["--date", "2024-01-01"]), vec!["c", "a"]);
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["c", "h", "a"]);
}

#[test]
fn test_reorder_rejects_ids_outside_view() {
    let tmp = TempDir::new().unwrap();
    let a = add(tmp.path(), "a", "2024-01-01");
    let h = add(tmp.path(), "h", "2024-05-05");
    let (_, stderr, success) = run_dl(tmp.path(), &["reorder", "--date", "2024-01-01", &h, &a]);
    assert!(!success);
    assert!(stderr.contains("not in the listed view"));
}

#[test]
fn test_sort_by_date_then_order() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "late", "2024-03-01");
    add(tmp.path(), "early", "2024-01-01");
    let undated = add(tmp.path(), "undated", "2024-02-01");
    run_dl_ok(tmp.path(), &["date", &undated]);
    run_dl_ok(tmp.path(), &["sort"]);

    let listed = list_json(tmp.path(), &[]);
    let pairs: Vec<(String, i64)> = listed["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["text"].as_str().unwrap().to_string(),
                t["order"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("undated".to_string(), 1),
            ("early".to_string(), 2),
            ("late".to_string(), 3),
        ]
    );
}

// ---------------------------------------------------------------------------
// Theme and storage
// ---------------------------------------------------------------------------

#[test]
fn test_theme_show_and_cycle() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(run_dl_ok(tmp.path(), &["theme"]).trim(), "light");
    assert_eq!(run_dl_ok(tmp.path(), &["theme", "--cycle"]).trim(), "dark");
    assert_eq!(run_dl_ok(tmp.path(), &["theme", "--cycle"]).trim(), "colored");
    assert_eq!(run_dl_ok(tmp.path(), &["theme", "--cycle"]).trim(), "light");
    assert_eq!(
        fs::read_to_string(tmp.path().join("theme_v2.json")).unwrap(),
        "\"light\""
    );
}

#[test]
fn test_legacy_blue_theme_reads_as_colored() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("theme_v2.json"), "blue").unwrap();
    assert_eq!(run_dl_ok(tmp.path(), &["theme"]).trim(), "colored");
}

#[test]
fn test_corrupt_tasks_fail_open_and_land_in_recovery() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks_v2.json"), "[{\"id\": oops").unwrap();

    assert_eq!(run_dl_ok(tmp.path(), &["list"]).trim(), "");
    let recovery = run_dl_ok(tmp.path(), &["recovery"]);
    assert!(recovery.contains("parser: slot tasks_v2 could not be parsed"));
    assert!(recovery.contains("[{\"id\": oops"));

    // The list keeps working from empty
    add(tmp.path(), "fresh start", "2024-01-01");
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["fresh start"]);
}

#[test]
fn test_records_from_older_versions_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("tasks_v2.json"),
        r#"[{"id":"k9x2m1a","text":"legacy","done":true,"date":"2023-12-31","order":3},
            {"id":"p0q","text":"no order","done":false,"date":""}]"#,
    )
    .unwrap();
    assert_eq!(listed_texts(tmp.path(), &[]), vec!["no order", "legacy"]);
    let id = add(tmp.path(), "next", "2024-01-01");
    let listed = list_json(tmp.path(), &[]);
    let added = listed["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == id.as_str())
        .unwrap()
        .clone();
    assert_eq!(added["order"], 4);
}

#[test]
fn test_recovery_empty() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(run_dl_ok(tmp.path(), &["recovery"]).trim(), "recovery log is empty");
}
