use csv::{ByteRecord, ReaderBuilder};

use super::types::ParsedTable;
use super::utils::{align_row, header_names};
use crate::error::AppError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Parses CSV bytes with header-row semantics. Blank lines are skipped and
/// never counted; every value is kept as a string.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedTable, AppError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let header = reader.byte_headers()?.clone();
    if header.is_empty() {
        tracing::warn!("CSV file has no header row");
        return Ok(ParsedTable::default());
    }

    let columns = header_names(header.iter().map(lossy));
    let width = columns.len();

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        if record.len() <= 1 && record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map_or(0, |p| p.line());
        let values = record.iter().map(lossy).collect();
        rows.push(align_row(values, width, line));
    }

    tracing::debug!("Parsed CSV with {} columns and {} rows", width, rows.len());
    Ok(ParsedTable::new(columns, rows))
}
