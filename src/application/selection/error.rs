use thiserror::Error;

/// Reasons a candidate never enters the selection. Reported inline, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("File {name} is too large. Maximum size is {limit}")]
    SizeExceeded { name: String, limit: String },

    #[error("File type {mime_type} is not accepted")]
    TypeRejected { mime_type: String },

    #[error("Maximum {max_files} files allowed")]
    CountExceeded { max_files: usize },
}
