use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("File processing error: {0}")]
    FileProcessingError(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("File contains no data rows")]
    EmptyFile,

    #[error("An analysis request is already in flight")]
    SubmissionInFlight,

    #[error("Transition already in progress: {0}")]
    TransitionInProgress(String),

    #[error("Login required")]
    Unauthenticated,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Message shown to the user. Parse and submission failures collapse to the
    /// two fixed notices the dashboard shows; everything else uses `Display`.
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileProcessingError(_) | AppError::UnsupportedFile(_) => {
                "failed to read file".to_string()
            }
            AppError::HttpError(_) | AppError::ParseError(_) => "analysis failed".to_string(),
            AppError::Unauthenticated => "login required".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::FileProcessingError(format!("Failed to parse CSV: {}", err))
    }
}
