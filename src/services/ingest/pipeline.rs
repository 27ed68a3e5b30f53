use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{error, info, warn};

use super::csv_parser::parse_csv;
use super::sheet_parser::parse_spreadsheet;
use super::types::{FileKind, ParseSummary, ParsedTable, PreviewRow, UploadedFile, PREVIEW_SIZE};
use super::utils::extract_reviews;
use crate::clients::BackendClient;
use crate::error::AppError;
use crate::models::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestState {
    #[default]
    Empty,
    Parsing,
    Ready,
}

#[derive(Debug, Default)]
struct IngestInner {
    state: IngestState,
    file: Option<UploadedFile>,
    columns: Vec<String>,
    preview: SmallVec<[PreviewRow; PREVIEW_SIZE]>,
    show_preview: bool,
}

/// Local file selection, parse and preview, plus the one explicit upload.
/// Nothing leaves the machine until `submit_for_analysis` is called.
#[derive(Debug)]
pub struct IngestPipeline {
    inner: Mutex<IngestInner>,
    generation: AtomicU64,
    in_flight: AtomicBool,
    max_file_size: usize,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub fn parse_file(kind: FileKind, bytes: Bytes) -> Result<ParsedTable, AppError> {
    match kind {
        FileKind::Csv => parse_csv(&bytes),
        FileKind::Spreadsheet(format) => parse_spreadsheet(bytes, format),
    }
}

impl IngestPipeline {
    pub fn new(max_file_size: usize) -> Self {
        Self {
            inner: Mutex::new(IngestInner::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            max_file_size,
        }
    }

    pub fn state(&self) -> IngestState {
        self.inner.lock().state
    }

    pub fn row_count(&self) -> usize {
        self.inner
            .lock()
            .file
            .as_ref()
            .and_then(|f| f.row_count)
            .unwrap_or(0)
    }

    pub fn file_name(&self) -> Option<String> {
        self.inner.lock().file.as_ref().map(|f| f.name.clone())
    }

    pub fn columns(&self) -> Vec<String> {
        self.inner.lock().columns.clone()
    }

    pub fn preview(&self) -> Vec<PreviewRow> {
        self.inner.lock().preview.to_vec()
    }

    pub fn show_preview(&self) -> bool {
        self.inner.lock().show_preview
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn can_submit(&self) -> bool {
        let inner = self.inner.lock();
        let rows = inner.file.as_ref().and_then(|f| f.row_count).unwrap_or(0);
        inner.state == IngestState::Ready && rows > 0 && !self.is_submitting()
    }

    /// Replaces any previous selection and parses the new file off the async
    /// runtime. A completion that belongs to an older selection is dropped
    /// and reported as `Cancelled`.
    pub async fn select_file(&self, name: &str, bytes: Bytes) -> Result<ParseSummary, AppError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let file = match self.validate(name, bytes) {
            Ok(file) => file,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        let kind = file.kind;
        let data = file.bytes.clone();

        {
            let mut inner = self.inner.lock();
            *inner = IngestInner {
                state: IngestState::Parsing,
                file: Some(file),
                ..IngestInner::default()
            };
        }
        info!("Parsing {} ({:?}, {}KB)", name, kind, data.len() / 1024);

        let parsed = tokio::task::spawn_blocking(move || {
            parse_file(kind, data).map(|table| {
                let reviews = extract_reviews(&table).len();
                (table, reviews)
            })
        })
        .await
        .map_err(|e| AppError::FileProcessingError(format!("Parser task failed: {}", e)))
        .and_then(|result| result);

        let mut inner = self.inner.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!("Discarding parse result for {}: a newer file was selected", name);
            return Err(AppError::Cancelled);
        }

        match parsed {
            Ok((table, reviews_detected)) => {
                let row_count = table.row_count();
                let preview = table.preview();
                if let Some(file) = inner.file.as_mut() {
                    file.row_count = Some(row_count);
                }
                inner.columns = table.columns().to_vec();
                inner.preview = preview.clone();
                inner.state = IngestState::Ready;
                info!("Parsed {}: {} rows, {} reviews detected", name, row_count, reviews_detected);

                Ok(ParseSummary {
                    file_name: name.to_string(),
                    row_count,
                    columns: inner.columns.clone(),
                    preview,
                    reviews_detected,
                })
            }
            Err(e) => {
                error!("Failed to read {}: {}", name, e);
                *inner = IngestInner::default();
                Err(e)
            }
        }
    }

    fn validate(&self, name: &str, bytes: Bytes) -> Result<UploadedFile, AppError> {
        if bytes.len() > self.max_file_size {
            return Err(AppError::InvalidInput(format!(
                "{} is {} bytes; the limit is {} bytes",
                name,
                bytes.len(),
                self.max_file_size
            )));
        }
        UploadedFile::new(name, bytes)
    }

    fn reset(&self) {
        *self.inner.lock() = IngestInner::default();
    }

    /// Flips preview visibility. Does nothing while there is nothing to show.
    pub fn toggle_preview(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.preview.is_empty() {
            return inner.show_preview;
        }
        inner.show_preview = !inner.show_preview;
        inner.show_preview
    }

    /// Uploads the original bytes of the selected file. Only one submission
    /// runs at a time; a failure leaves the selection in place for a retry.
    pub async fn submit_for_analysis(&self, client: &BackendClient) -> Result<AnalysisResult, AppError> {
        let (name, mime, bytes) = {
            let inner = self.inner.lock();
            match inner.file.as_ref() {
                Some(file)
                    if inner.state == IngestState::Ready && file.row_count.unwrap_or(0) > 0 =>
                {
                    (file.name.clone(), file.kind.mime(), file.bytes.clone())
                }
                _ => return Err(AppError::EmptyFile),
            }
        };

        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            warn!("Ignoring analysis request for {}: one is already in flight", name);
            AppError::SubmissionInFlight
        })?;

        client.analyze_file(&name, mime, bytes).await.map_err(|e| {
            error!("Analysis of {} failed: {}", name, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const CSV: &[u8] = b"review,rating\nLovely staff,5\nToo slow,2\nGreat coffee,4\n";

    fn pipeline() -> IngestPipeline {
        IngestPipeline::new(1024 * 1024)
    }

    #[tokio::test]
    async fn csv_selection_reaches_ready() {
        let pipeline = pipeline();
        let summary = pipeline
            .select_file("reviews.csv", Bytes::from_static(CSV))
            .await
            .unwrap();

        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.preview.len(), 3);
        assert_eq!(summary.reviews_detected, 3);
        assert_eq!(pipeline.state(), IngestState::Ready);
        assert!(pipeline.can_submit());
    }

    #[tokio::test]
    async fn header_only_file_cannot_be_submitted() {
        let pipeline = pipeline();
        let summary = pipeline
            .select_file("reviews.csv", Bytes::from_static(b"review,rating\n"))
            .await
            .unwrap();

        assert_eq!(summary.row_count, 0);
        assert!(summary.preview.is_empty());
        assert!(!pipeline.can_submit());

        let client = BackendClient::new(&Config::default()).unwrap();
        assert!(matches!(
            pipeline.submit_for_analysis(&client).await,
            Err(AppError::EmptyFile)
        ));
    }

    #[tokio::test]
    async fn malformed_spreadsheet_resets_to_empty() {
        let pipeline = pipeline();
        pipeline
            .select_file("reviews.csv", Bytes::from_static(CSV))
            .await
            .unwrap();

        let result = pipeline
            .select_file("data.xlsx", Bytes::from_static(b"PK\x03\x04garbage"))
            .await;

        assert!(matches!(result, Err(AppError::FileProcessingError(_))));
        assert_eq!(pipeline.state(), IngestState::Empty);
        assert_eq!(pipeline.row_count(), 0);
        assert!(pipeline.preview().is_empty());
        assert_eq!(pipeline.file_name(), None);
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let pipeline = pipeline();
        let result = pipeline
            .select_file("notes.txt", Bytes::from_static(b"hello"))
            .await;
        assert!(matches!(result, Err(AppError::UnsupportedFile(_))));
        assert_eq!(pipeline.state(), IngestState::Empty);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let pipeline = IngestPipeline::new(8);
        let result = pipeline.select_file("reviews.csv", Bytes::from_static(CSV)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn toggle_is_noop_without_preview() {
        let pipeline = pipeline();
        assert!(!pipeline.toggle_preview());

        pipeline
            .select_file("reviews.csv", Bytes::from_static(CSV))
            .await
            .unwrap();
        assert!(pipeline.toggle_preview());
        assert!(!pipeline.toggle_preview());
    }

    #[tokio::test]
    async fn stale_parse_is_discarded() {
        let pipeline = pipeline();
        let newer: &[u8] = b"review\nonly one\n";

        let (first, second) = tokio::join!(
            pipeline.select_file("old.csv", Bytes::from_static(CSV)),
            pipeline.select_file("new.csv", Bytes::from_static(newer)),
        );

        assert!(matches!(first, Err(AppError::Cancelled)));
        assert_eq!(second.unwrap().row_count, 1);
        assert_eq!(pipeline.file_name().as_deref(), Some("new.csv"));
        assert_eq!(pipeline.row_count(), 1);
    }

    #[tokio::test]
    async fn reselecting_clears_previous_preview_state() {
        let pipeline = pipeline();
        pipeline
            .select_file("reviews.csv", Bytes::from_static(CSV))
            .await
            .unwrap();
        pipeline.toggle_preview();

        pipeline
            .select_file("other.csv", Bytes::from_static(b"review\nsolo entry\n"))
            .await
            .unwrap();

        assert!(!pipeline.show_preview());
        assert_eq!(pipeline.preview().len(), 1);
    }
}
