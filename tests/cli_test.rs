//! Integration tests for the CLI binary.
//!
//! The binary parses a remessa file and prints its lenient re-render, so
//! feeding it a fully populated file must reproduce the input exactly.

use assert_cmd::Command;
use cnab240::block::PAYMENT_VALUE;
use cnab240::{layouts, Batch, CnabFile, FieldKind, Record, Template};
use predicates::prelude::*;
use std::io::Write;

fn fill_template(template: &mut Template) {
    let blanks: Vec<(String, FieldKind)> = template
        .fields()
        .iter()
        .filter(|f| f.value.is_none())
        .map(|f| (f.spec.name.clone(), f.spec.kind))
        .collect();
    for (name, kind) in blanks {
        match kind {
            FieldKind::Num => template.set(&name, 3i64).unwrap(),
            FieldKind::Text => template.set(&name, "EMPRESA").unwrap(),
        }
    }
}

/// Renders a complete two-payment remessa file.
fn sample_remessa() -> String {
    let catalog = layouts::itau();
    let mut file = CnabFile::new(&catalog, layouts::FILE_LAYOUT).unwrap();
    let mut batch = Batch::new(&catalog, layouts::BATCH_LAYOUT).unwrap();
    for value in [12345i64, 67890] {
        let mut record = Record::new(&catalog, layouts::RECORD_LAYOUT).unwrap();
        record.content_mut().set(PAYMENT_VALUE, value).unwrap();
        batch.add(record).unwrap();
    }
    file.add(batch).unwrap();

    fill_template(file.header_mut());
    fill_template(file.trailer_mut());
    for batch in file.batches_mut() {
        fill_template(batch.header_mut());
        fill_template(batch.trailer_mut());
        for record in batch.records_mut() {
            fill_template(record.content_mut());
        }
    }
    file.render(true).unwrap()
}

#[test]
fn test_parse_and_reprint_round_trips() {
    let remessa = sample_remessa();

    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(remessa.as_bytes()).unwrap();

    let mut cmd = Command::cargo_bin("cnab240").unwrap();
    let assert = cmd.arg(input.path()).assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout, remessa);
}

#[test]
fn test_missing_argument_error() {
    let mut cmd = Command::cargo_bin("cnab240").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file"));
}

#[test]
fn test_missing_file_error() {
    let mut cmd = Command::cargo_bin("cnab240").unwrap();
    cmd.arg("nonexistent.rem")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_truncated_file_error() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(b"only\ntwo lines\n").unwrap();

    let mut cmd = Command::cargo_bin("cnab240").unwrap();
    cmd.arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 5"));
}
