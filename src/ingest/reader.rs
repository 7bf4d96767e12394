//! Tab-delimited export reader.

use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{CoursegraphError, Result};
use crate::ingest::row::{RawRow, COLUMNS};

/// Read every row of the export at `path`, decoding with `encoding_label`.
pub fn read_offerings(path: &Path, encoding_label: &str) -> Result<Vec<RawRow>> {
    let bytes = std::fs::read(path).map_err(|e| CoursegraphError::MalformedInput {
        line: 0,
        reason: format!("cannot open {}: {}", path.display(), e),
    })?;
    let text = decode(&bytes, encoding_label)?;
    let rows = parse_offerings(&text)?;
    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Decode raw export bytes. Malformed sequences are rejected rather than replaced.
pub fn decode(bytes: &[u8], encoding_label: &str) -> Result<String> {
    let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| {
        CoursegraphError::Config(format!("unknown encoding label: {}", encoding_label))
    })?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(CoursegraphError::MalformedInput {
            line: 0,
            reason: format!("input is not valid {}", encoding.name()),
        });
    }
    Ok(text.into_owned())
}

/// Split decoded text into rows.
///
/// Each line with any content must hold the 16 export columns, optionally followed
/// by one empty field left by a trailing tab. A leading header line is skipped.
pub fn parse_offerings(text: &str) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        // Tabs are field separators, so a tab-only line still has a shape to check.
        if line.trim_matches(' ').is_empty() {
            continue;
        }

        let mut fields: Vec<String> = line.split('\t').map(str::to_string).collect();

        if fields.len() == COLUMNS.len() + 1 {
            match fields.pop() {
                Some(placeholder) if placeholder.trim().is_empty() => {}
                _ => {
                    return Err(CoursegraphError::MalformedInput {
                        line: line_no,
                        reason: "trailing placeholder column is not empty".to_string(),
                    })
                }
            }
        }

        let fields: [String; 16] = fields.try_into().map_err(|found: Vec<String>| {
            CoursegraphError::MalformedInput {
                line: line_no,
                reason: format!("expected {} fields, found {}", COLUMNS.len(), found.len()),
            }
        })?;

        if rows.is_empty() && fields[0] == COLUMNS[0] {
            log::debug!("Skipping header line {}", line_no);
            continue;
        }

        rows.push(RawRow::from_fields(fields));
    }

    Ok(rows)
}
