use thiserror::Error;

/// Failures of the submit path. The status-fetch path never errors; it folds
/// everything into a `FetchOutcome` for the classifier instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend returned status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("backend response rejected: {0}")]
    Envelope(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
