use std::sync::Arc;

use bytes::Bytes;
use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::error::AppError;

pub const PREVIEW_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet(SpreadsheetFormat),
}

impl FileKind {
    /// Extension match is case-insensitive: `reviews.CSV` is a CSV file.
    pub fn from_name(name: &str) -> Result<Self, AppError> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" => Ok(FileKind::Spreadsheet(SpreadsheetFormat::Xlsx)),
            "xls" => Ok(FileKind::Spreadsheet(SpreadsheetFormat::Xls)),
            _ => Err(AppError::UnsupportedFile(format!(
                "{} (only csv and xlsx files are supported)",
                name
            ))),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            FileKind::Csv => "text/csv",
            FileKind::Spreadsheet(SpreadsheetFormat::Xlsx) => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FileKind::Spreadsheet(SpreadsheetFormat::Xls) => "application/vnd.ms-excel",
        }
    }
}

/// A local file waiting to be analyzed. `bytes` is what gets uploaded, never
/// the parsed form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub kind: FileKind,
    pub bytes: Bytes,
    pub row_count: Option<usize>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Bytes) -> Result<Self, AppError> {
        let name = name.into();
        let kind = FileKind::from_name(&name)?;
        Ok(Self {
            name,
            kind,
            bytes,
            row_count: None,
        })
    }
}

/// One parsed record keyed by the file's header names, in header order.
/// Rows of the same table share one column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    columns: Arc<Vec<String>>,
    values: Vec<String>,
}

impl PreviewRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl Serialize for PreviewRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    columns: Arc<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Every row must already be aligned to `columns.len()`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            columns: Arc::new(columns),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = PreviewRow> + '_ {
        self.rows.iter().map(|values| PreviewRow {
            columns: Arc::clone(&self.columns),
            values: values.clone(),
        })
    }

    pub fn preview(&self) -> SmallVec<[PreviewRow; PREVIEW_SIZE]> {
        self.rows().take(PREVIEW_SIZE).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSummary {
    pub file_name: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub preview: SmallVec<[PreviewRow; PREVIEW_SIZE]>,
    pub reviews_detected: usize,
}
