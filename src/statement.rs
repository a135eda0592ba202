//! Control statement readers and writers.
//!
//! Source documents arrive as comma- or pipe-delimited exports, or as
//! line-delimited JSON records. Delimited exports come from many
//! organizations and are inconsistently formatted, so those readers recover
//! what they can and silently drop what they cannot. Line records are
//! programmatically generated, so a malformed line is a hard failure.

use crate::error::{CollateError, Result};
use encoding_rs::Encoding;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlStatement {
    pub control: String,
    pub text: String,
}

impl ControlStatement {
    pub fn new(control: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            text: text.into(),
        }
    }
}

lazy_static! {
    // leading run of control-id token characters, optionally wrapped in '['
    static ref CONTROL_FIELD: Regex = Regex::new(r"^\[?([\w.\-\\()]+)").unwrap();
    // split at the first run of whitespace
    static ref FIRST_WHITESPACE: Regex = Regex::new(r"^(\S+)\s+(.*)$").unwrap();
}

/// Extract a control identifier from a raw field: the leading run of token
/// characters, with any wrapping bracket removed. Falls back to the trimmed
/// field verbatim when nothing matches.
pub fn control_id_field(field: &str) -> String {
    let trimmed = field.trim();
    match CONTROL_FIELD.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderFormat {
    Csv,
    Psv,
    Jsonl,
}

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub control_id_col: usize,
    pub statement_col: usize,
    pub skip_lines: usize,
    pub encoding: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            control_id_col: 0,
            statement_col: 1,
            skip_lines: 0,
            encoding: "utf-8".to_string(),
        }
    }
}

impl ReaderOptions {
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        let encoding = Encoding::for_label(self.encoding.as_bytes()).ok_or_else(|| {
            CollateError::Config(format!("unknown encoding '{}'", self.encoding))
        })?;
        let (text, _, _) = encoding.decode(bytes);
        Ok(text.into_owned())
    }
}

pub trait StatementReader {
    fn read(&self, path: &Path) -> Result<Vec<ControlStatement>>;
}

/// Select a reader by explicit format tag.
pub fn reader_for(format: ReaderFormat, options: ReaderOptions) -> Box<dyn StatementReader> {
    match format {
        ReaderFormat::Csv => Box::new(DelimitedReader::new(b',', options)),
        ReaderFormat::Psv => Box::new(DelimitedReader::new(b'|', options)),
        ReaderFormat::Jsonl => Box::new(LineRecordReader::new(options)),
    }
}

/// Reads rows separated by a single-byte delimiter, with the control id in
/// one configured column and the statement text in another.
pub struct DelimitedReader {
    delimiter: u8,
    options: ReaderOptions,
}

impl DelimitedReader {
    pub fn new(delimiter: u8, options: ReaderOptions) -> Self {
        Self { delimiter, options }
    }

    fn statement(&self, row: &csv::StringRecord) -> Option<ControlStatement> {
        match row.len() {
            0 => None,
            1 => {
                // the delimiter is sometimes missing entirely; split the
                // single field at the first run of whitespace instead
                let caps = FIRST_WHITESPACE.captures(row.get(0)?)?;
                Some(ControlStatement::new(
                    control_id_field(&caps[1]),
                    caps[2].trim(),
                ))
            }
            _ => {
                let control = control_id_field(row.get(self.options.control_id_col)?);
                let text = row.get(self.options.statement_col)?.trim();
                Some(ControlStatement::new(control, text))
            }
        }
    }
}

impl StatementReader for DelimitedReader {
    fn read(&self, path: &Path) -> Result<Vec<ControlStatement>> {
        let bytes = fs::read(path)?;
        let text = self.options.decode(&bytes)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());

        let mut statements = Vec::new();
        for (index, row) in reader.records().enumerate() {
            if index < self.options.skip_lines {
                continue;
            }
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    debug!("dropping unreadable row in {}: {}", path.display(), err);
                    continue;
                }
            };
            if let Some(statement) = self.statement(&row) {
                statements.push(statement);
            }
        }
        Ok(statements)
    }
}

/// Reads newline-delimited JSON records with required `control` and `text`
/// keys. This format is machine-generated, so corruption is never masked.
pub struct LineRecordReader {
    options: ReaderOptions,
}

impl LineRecordReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }
}

impl StatementReader for LineRecordReader {
    fn read(&self, path: &Path) -> Result<Vec<ControlStatement>> {
        let bytes = fs::read(path)?;
        let text = self.options.decode(&bytes)?;
        let mut statements = Vec::new();
        for (index, line) in text.lines().enumerate().skip(self.options.skip_lines) {
            let statement: ControlStatement =
                serde_json::from_str(line).map_err(|err| CollateError::LineRecord {
                    path: path.display().to_string(),
                    line: index + 1,
                    message: err.to_string(),
                })?;
            statements.push(statement);
        }
        Ok(statements)
    }
}

/// Write statements in the given format. The pipe-separated form cannot
/// represent newlines, so text is flattened to a single line there.
pub fn write_statements(
    format: ReaderFormat,
    out: &mut dyn Write,
    statements: &[ControlStatement],
) -> Result<()> {
    match format {
        ReaderFormat::Psv => {
            for statement in statements {
                writeln!(
                    out,
                    "{} | {}",
                    statement.control,
                    statement.text.replace('\n', " ").trim()
                )?;
            }
        }
        ReaderFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for statement in statements {
                writer.write_record([&statement.control, &statement.text])?;
            }
            writer.flush()?;
        }
        ReaderFormat::Jsonl => {
            for statement in statements {
                writeln!(out, "{}", serde_json::to_string(statement)?)?;
            }
        }
    }
    Ok(())
}
