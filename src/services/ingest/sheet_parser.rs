use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};

use super::types::{ParsedTable, SpreadsheetFormat};
use super::utils::{align_row, cell_to_string, header_names, is_blank_row};
use crate::error::AppError;

/// Decodes the first sheet (by position) of an in-memory workbook. The
/// container format is detected from the bytes; `labeled` is only what the
/// file name claims. The first non-blank row is the header; blank rows are
/// skipped.
pub fn parse_spreadsheet(file_data: Bytes, labeled: SpreadsheetFormat) -> Result<ParsedTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(file_data)).map_err(|e| {
        tracing::error!("Failed to open workbook: {}", e);
        AppError::FileProcessingError(format!("Failed to open Excel file: {}", e))
    })?;

    let detected = detected_format(&workbook);
    if detected != Some(labeled) {
        tracing::debug!("Workbook labeled {:?} is actually {:?}", labeled, detected);
    }

    let range = first_sheet(&mut workbook)?;
    Ok(table_from_range(&range))
}

fn detected_format<RS>(workbook: &Sheets<RS>) -> Option<SpreadsheetFormat> {
    match workbook {
        Sheets::Xls(_) => Some(SpreadsheetFormat::Xls),
        Sheets::Xlsx(_) => Some(SpreadsheetFormat::Xlsx),
        Sheets::Xlsb(_) | Sheets::Ods(_) => None,
    }
}

fn first_sheet(workbook: &mut Sheets<Cursor<Bytes>>) -> Result<Range<Data>, AppError> {
    let sheet_names = workbook.sheet_names();
    tracing::debug!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileProcessingError("No sheets found in workbook".to_string()))?
        .map_err(|e| AppError::FileProcessingError(format!("Failed to read worksheet: {}", e)))
}

fn table_from_range(range: &Range<Data>) -> ParsedTable {
    let mut rows = range.rows().filter(|row| !is_blank_row(row));

    let Some(header) = rows.next() else {
        tracing::warn!("First sheet is empty");
        return ParsedTable::default();
    };

    let columns = header_names(header.iter().map(cell_to_string));
    let width = columns.len();
    let start_line = range.start().map_or(0, |(row, _)| row as u64);

    let data = rows
        .enumerate()
        .map(|(idx, row)| {
            let values = row.iter().map(cell_to_string).collect();
            align_row(values, width, start_line + idx as u64 + 2)
        })
        .collect();

    ParsedTable::new(columns, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_workbook_bytes_fail_to_open() {
        let junk = Bytes::from_static(b"\x00\x01not a zip archive at all\xff\xfe");
        let err = parse_spreadsheet(junk, SpreadsheetFormat::Xlsx).unwrap_err();
        assert!(matches!(err, AppError::FileProcessingError(_)));
    }

    #[test]
    fn xlsx_content_with_xls_name_is_still_read() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "review").unwrap();
        sheet.write_string(1, 0, "Lovely terrace").unwrap();
        sheet.write_string(2, 0, "Cold soup").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = parse_spreadsheet(Bytes::from(bytes), SpreadsheetFormat::Xls).unwrap();

        assert_eq!(table.columns(), ["review"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.preview()[1].get("review"), Some("Cold soup"));
    }

    #[test]
    fn range_rows_become_keyed_records() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("review".into()));
        range.set_value((0, 1), Data::String("rating".into()));
        range.set_value((1, 0), Data::String("tasty".into()));
        range.set_value((1, 1), Data::Float(5.0));
        // row 2 left blank
        range.set_value((3, 0), Data::String("cold".into()));
        range.set_value((3, 1), Data::Int(2));

        let table = table_from_range(&range);
        assert_eq!(table.row_count(), 2);

        let preview = table.preview();
        assert_eq!(preview[0].get("rating"), Some("5"));
        assert_eq!(preview[1].get("review"), Some("cold"));
    }

    #[test]
    fn empty_range_yields_empty_table() {
        let range: Range<Data> = Range::empty();
        assert_eq!(table_from_range(&range).row_count(), 0);
    }
}
