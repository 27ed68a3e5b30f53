pub mod csv_parser;
pub mod pipeline;
pub mod sheet_parser;
pub mod types;
pub mod utils;

pub use pipeline::{IngestPipeline, IngestState};
pub use types::{FileKind, ParseSummary, ParsedTable, PreviewRow, UploadedFile, PREVIEW_SIZE};
