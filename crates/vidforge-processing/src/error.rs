use thiserror::Error;
use vidforge_core::AppError;

/// Errors raised while staging or processing an upload
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Upload stream failed: {0}")]
    Stream(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Remux failed: {0}")]
    Remux(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "File exceeds the maximum size of {} bytes",
                limit
            )),
            ProcessingError::Stream(msg) => {
                AppError::BadRequest(format!("Failed to read upload: {}", msg))
            }
            ProcessingError::Probe(msg) => AppError::Probe(msg),
            ProcessingError::Remux(msg) => AppError::Remux(msg),
            ProcessingError::InvalidPath(msg) => AppError::Internal(msg),
            ProcessingError::Io(e) => AppError::Internal(format!("Staging IO error: {}", e)),
        }
    }
}
