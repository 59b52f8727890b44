use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use calamine::{open_workbook_auto, Reader};
use predicates::prelude::*;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn eureka() -> Command {
    Command::cargo_bin("eureka").unwrap()
}

#[test]
fn identical_files_exit_zero() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,amount\n1,2.50\n2,3\n");
    let new = write_csv(dir.path(), "new.csv", "id,amount\n1,2.5\n2,3.0\n");

    eureka()
        .arg(&old)
        .arg(&new)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No differences found."));
}

#[test]
fn strict_decimal_flags_trailing_zeros() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,amount\n1,2.50\n");
    let new = write_csv(dir.path(), "new.csv", "id,amount\n1,2.5\n");

    eureka()
        .args(["--key", "id", "--strict-decimal"])
        .arg(&old)
        .arg(&new)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("amount: 2.50 → 2.5"));
}

#[test]
fn keyed_change_is_listed() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,val\n1,x\n");
    let new = write_csv(dir.path(), "new.csv", "id,val\n1,y\n");

    eureka()
        .args(["-k", "id"])
        .arg(&old)
        .arg(&new)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("~1 changed"))
        .stdout(predicate::str::contains("val: x → y"));
}

#[test]
fn duplicate_key_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,val\n1,x\n1,y\n");
    let new = write_csv(dir.path(), "new.csv", "id,val\n1,x\n");

    eureka()
        .args(["-k", "id"])
        .arg(&old)
        .arg(&new)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("duplicate key '1' in old file (lines 2 and 3)"));
}

#[test]
fn missing_key_column_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,val\n1,x\n");
    let new = write_csv(dir.path(), "new.csv", "sku,val\n1,x\n");

    eureka()
        .args(["-k", "id"])
        .arg(&old)
        .arg(&new)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("key column 'id' not found in new file"));
}

#[test]
fn empty_file_fails_only_when_requested() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id\n1\n2\n");
    let new = write_csv(dir.path(), "new.csv", "id\n");

    eureka()
        .arg("--stats-only")
        .arg(&old)
        .arg(&new)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Removed:   2"));

    eureka()
        .arg("--fail-on-empty")
        .arg(&old)
        .arg(&new)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("the new file contains no data rows"));
}

#[test]
fn json_format_is_parseable() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "n\n5\n5\n");
    let new = write_csv(dir.path(), "new.csv", "n\n5\n");

    let output = eureka()
        .args(["--format", "json"])
        .arg(&old)
        .arg(&new)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["rows_unchanged"], 1);
    assert_eq!(value["stats"]["rows_removed"], 1);
    assert_eq!(value["row_changes"][0]["type"], "removed");
    assert_eq!(value["row_changes"][0]["old_line"], 3);
}

#[test]
fn report_is_written_to_output_path() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id,val\n1,x\n2,y\n");
    let new = write_csv(dir.path(), "new.csv", "id,val\n1,x\n3,z\n");
    let report = dir.path().join("report.xlsx");

    eureka()
        .args(["-k", "id", "--format", "xlsx", "-o"])
        .arg(&report)
        .arg(&old)
        .arg(&new)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    let mut workbook = open_workbook_auto(&report).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Summary", "Columns", "OnlyInOld", "OnlyInNew", "CellDiffs"]
    );
    let removed = workbook.worksheet_range("OnlyInOld").unwrap();
    assert_eq!(removed.get_size().0, 2);
}

#[test]
fn malformed_csv_names_the_line() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "a,b\n1,2\n3,4,5\n");
    let new = write_csv(dir.path(), "new.csv", "a,b\n1,2\n");

    eureka()
        .arg(&old)
        .arg(&new)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("malformed old file at line 3"));
}

#[test]
fn workbook_input_is_named_in_the_error() {
    let dir = TempDir::new().unwrap();
    let old = write_csv(dir.path(), "old.csv", "id\n1\n");
    let new = dir.path().join("new.xlsx");
    fs::write(&new, b"PK\x03\x04not-really-a-zip").unwrap();

    eureka()
        .arg(&old)
        .arg(&new)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("looks like an xlsx workbook"));
}
