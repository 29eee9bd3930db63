//! Parser for tab-separated triple files.
//!
//! Format: `row<TAB>col<TAB>value`, one record per line, zero-based indices.
//! Blank lines are skipped; anything else that does not parse is an error
//! carrying the file name and line number.

use crate::error::{DataLoadError, Result};
use crate::types::Interaction;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const FIELDS_PER_RECORD: usize = 3;

/// Read a whole file into memory, mapping a missing file to `FileNotFound`.
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Parse a triple file from disk.
pub fn parse_triples(path: &Path) -> Result<Vec<Interaction>> {
    let content = read_file(path)?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_triples_str(&content, &file)
}

/// Parse triples from an in-memory string.
///
/// `file` is only used to label errors.
pub fn parse_triples_str(content: &str, file: &str) -> Result<Vec<Interaction>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line_trimmed.split('\t').map(str::trim).collect();
        if fields.len() != FIELDS_PER_RECORD {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.to_string(),
                expected: FIELDS_PER_RECORD,
                found: fields.len(),
                line: line_no,
            });
        }

        let row = fields[0].parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid row index '{}': {}", fields[0], e),
        })?;
        let col = fields[1].parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid column index '{}': {}", fields[1], e),
        })?;
        let value: f64 = fields[2].parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid value '{}': {}", fields[2], e),
        })?;
        if !value.is_finite() {
            return Err(DataLoadError::InvalidValue {
                file: file.to_string(),
                line: line_no,
                field: "value".to_string(),
                value: fields[2].to_string(),
            });
        }

        records.push(Interaction { row, col, value });
    }

    Ok(records)
}
