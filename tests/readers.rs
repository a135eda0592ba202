use ssp_collator::statement::{reader_for, ReaderFormat, ReaderOptions};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn csv_reader_reads_control_and_text() {
    let fixture = write_fixture("AC-1, Statement for AC-1\nIA-4, Statement for IA-4\n");
    let reader = reader_for(ReaderFormat::Csv, ReaderOptions::default());
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].control, "AC-1");
    assert_eq!(statements[0].text, "Statement for AC-1");
    assert_eq!(statements[1].control, "IA-4");
    assert_eq!(statements[1].text, "Statement for IA-4");
}

#[test]
fn psv_reader_recovers_noisy_rows() {
    let fixture = write_fixture(
        "\nAC-1 | Statement for AC-1\nIA-4 | Statement for IA-4\nRA-3 extra text | Statement for RA-3\n[RA-4] | Statement for RA-4\n",
    );
    let reader = reader_for(ReaderFormat::Psv, ReaderOptions::default());
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0].control, "AC-1");
    assert_eq!(statements[1].control, "IA-4");
    // noise after the control id is dropped
    assert_eq!(statements[2].control, "RA-3");
    assert_eq!(statements[2].text, "Statement for RA-3");
    // wrapping brackets are stripped
    assert_eq!(statements[3].control, "RA-4");
}

#[test]
fn psv_reader_splits_on_whitespace_when_delimiter_missing() {
    let fixture = write_fixture("RA-3 Statement for RA-3\n");
    let reader = reader_for(ReaderFormat::Psv, ReaderOptions::default());
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].control, "RA-3");
    assert_eq!(statements[0].text, "Statement for RA-3");
}

#[test]
fn psv_reader_honors_column_configuration() {
    let fixture = write_fixture(
        "Access Control | AC-1 | Statement for AC-1\nIdentity |IA-4 | Statement for IA-4\nRisk | RA-3 extra text | Statement for RA-3\nRisk | [RA-4] | Statement for RA-4\n",
    );
    let options = ReaderOptions {
        control_id_col: 1,
        statement_col: 2,
        ..ReaderOptions::default()
    };
    let reader = reader_for(ReaderFormat::Psv, options);
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0].control, "AC-1");
    assert_eq!(statements[1].control, "IA-4");
    assert_eq!(statements[2].control, "RA-3");
    assert_eq!(statements[3].control, "RA-4");
    assert_eq!(statements[3].text, "Statement for RA-4");
}

#[test]
fn delimited_reader_skips_leading_lines() {
    let fixture = write_fixture("Control, Description\nAC-1, Statement for AC-1\n");
    let options = ReaderOptions {
        skip_lines: 1,
        ..ReaderOptions::default()
    };
    let reader = reader_for(ReaderFormat::Csv, options);
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].control, "AC-1");
}

#[test]
fn jsonl_reader_reads_line_records() {
    let fixture = write_fixture(
        "{\"control\": \"AC-1\", \"text\": \"Statement for AC-1\"}\n{\"control\": \"IA-4\", \"text\": \"Statement for IA-4\"}\n",
    );
    let reader = reader_for(ReaderFormat::Jsonl, ReaderOptions::default());
    let statements = reader.read(fixture.path()).unwrap();

    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].control, "AC-1");
    assert_eq!(statements[1].text, "Statement for IA-4");
}

#[test]
fn jsonl_reader_fails_loudly_on_corruption() {
    let fixture = write_fixture(
        "{\"control\": \"AC-1\", \"text\": \"Statement for AC-1\"}\nnot json at all\n",
    );
    let reader = reader_for(ReaderFormat::Jsonl, ReaderOptions::default());
    let err = reader.read(fixture.path()).unwrap_err();
    // the offending line is identified
    assert!(err.to_string().contains(":2"), "{}", err);
}

#[test]
fn jsonl_reader_requires_control_and_text_keys() {
    let fixture = write_fixture("{\"control\": \"AC-1\"}\n");
    let reader = reader_for(ReaderFormat::Jsonl, ReaderOptions::default());
    assert!(reader.read(fixture.path()).is_err());
}

#[test]
fn latin1_exports_decode_with_configured_encoding() {
    let mut file = NamedTempFile::new().unwrap();
    // "sécurité" in ISO-8859-1
    file.write_all(b"AC-1, s\xe9curit\xe9\n").unwrap();
    file.flush().unwrap();

    let options = ReaderOptions {
        encoding: "latin1".to_string(),
        ..ReaderOptions::default()
    };
    let reader = reader_for(ReaderFormat::Csv, options);
    let statements = reader.read(file.path()).unwrap();
    assert_eq!(statements[0].text, "sécurité");
}
