use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT: &str = "SUPERMERCADO LA ECONOMIA
NIT 900.123.456-7
FECHA: 26/06/2025
1 LECHE ENTERA 1L 3.500,00
2 PAN TAJADO 4.200,00
TOTAL $12.930
";

/// Temp dir holding an empty config so the user's own config is never read.
fn workspace() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    let config = config.to_str().unwrap().to_string();
    (dir, config)
}

fn recibo() -> Command {
    Command::cargo_bin("recibo").unwrap()
}

#[test]
fn process_file_as_json() {
    let (dir, config) = workspace();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, RECEIPT).unwrap();

    recibo()
        .args(["-c", &config, "process"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""vendor": "SUPERMERCADO LA ECONOMIA""#))
        .stdout(predicate::str::contains(r#""total": "$12.930""#))
        .stdout(predicate::str::contains(r#""date": "26/06/2025""#))
        .stdout(predicate::str::contains(r#""is_valid": true"#));
}

#[test]
fn process_stdin_as_csv() {
    let (_dir, config) = workspace();

    recibo()
        .args(["-c", &config, "process", "-", "--format", "csv"])
        .write_stdin("TIENDA EL SOL\nTOTAL 5.000\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "date,vendor,total,items,raw_text,is_valid,missing_fields",
        ))
        .stdout(predicate::str::contains("TIENDA EL SOL,$5.000"))
        .stdout(predicate::str::contains("false,date"));
}

#[test]
fn process_explain_reports_strategies() {
    let (dir, config) = workspace();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, RECEIPT).unwrap();

    recibo()
        .args(["-c", &config, "process", "--explain", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:   yes"))
        .stderr(predicate::str::contains("keyword_line"));
}

#[test]
fn process_missing_file_fails() {
    let (dir, config) = workspace();

    recibo()
        .args(["-c", &config, "process"])
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_accumulated_export() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("a.txt"), RECEIPT).unwrap();
    fs::write(dir.path().join("b.txt"), "TIENDA EL SOL\nTOTAL 5.000\n").unwrap();
    let output = dir.path().join("recibos.json");
    let pattern = dir.path().join("*.txt");

    recibo()
        .args(["-c", &config, "batch", pattern.to_str().unwrap(), "--summary", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total receipts:   2"))
        .stdout(predicate::str::contains("Valid:            1 (50.0%)"));

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["vendor"], "SUPERMERCADO LA ECONOMIA");
    assert_eq!(records[1]["missing_fields"], serde_json::json!(["date"]));

    let summary = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,valid"));
    assert!(summary.contains("b.txt,incomplete"));
}

#[test]
fn batch_skips_unreadable_files_when_asked() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("a.txt"), RECEIPT).unwrap();
    fs::write(dir.path().join("b.txt"), [0xff, 0xfe, 0x00]).unwrap();
    let output = dir.path().join("recibos.csv");
    let pattern = dir.path().join("*.txt");

    recibo()
        .args(["-c", &config, "batch", pattern.to_str().unwrap(), "-f", "csv"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    recibo()
        .args(["-c", &config, "batch", pattern.to_str().unwrap(), "-f", "csv"])
        .arg("--continue-on-error")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unreadable:       1 (50.0%)"));

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.matches("SUPERMERCADO LA ECONOMIA").count(), 2);
}

#[test]
fn batch_without_matches_fails() {
    let (dir, config) = workspace();
    let pattern = dir.path().join("*.txt");

    recibo()
        .args(["-c", &config, "batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn config_commands_use_the_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("local.json");
    fs::write(&local, r#"{"extraction":{"total_keyword":"neto"}}"#).unwrap();
    let local_arg = local.to_str().unwrap();

    recibo()
        .args(["-c", local_arg, "config", "get", "extraction.total_keyword"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"neto\""));

    recibo()
        .args(["-c", local_arg, "config", "set", "extraction.total_keyword", "pagar"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&local).unwrap()).unwrap();
    assert_eq!(saved["extraction"]["total_keyword"], "pagar");

    recibo()
        .args(["-c", local_arg, "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(local_arg));
}

#[test]
fn process_ignores_byte_order_mark() {
    let (dir, config) = workspace();
    let input = dir.path().join("bom.txt");
    let mut bytes = vec![0xef, 0xbb, 0xbf];
    bytes.extend_from_slice(b"SUPERMERCADO LA ECONOMIA\nTOTAL 5.000\n");
    fs::write(&input, bytes).unwrap();

    recibo()
        .args(["-c", &config, "process"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""vendor": "SUPERMERCADO LA ECONOMIA""#))
        .stdout(predicate::str::contains("\u{feff}").not());
}
