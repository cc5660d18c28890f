use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid image path: {0}")]
    InvalidPath(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("No free image name left for {0}")]
    NameExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            StorageError::InvalidPath(msg) | StorageError::UnsupportedType(msg) => {
                ApplicationError::BadRequest(msg)
            }
            StorageError::NameExhausted(slug) => {
                ApplicationError::InternalError(format!("No free image name left for {}", slug))
            }
            StorageError::Io(e) => ApplicationError::InternalError(format!("Storage error: {}", e)),
        }
    }
}
