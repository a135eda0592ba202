use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollateError {
    #[error("Reader configuration error: {0}")]
    Config(String),

    #[error("Malformed record at {path}:{line}: {message}")]
    LineRecord {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Missing metadata field '{field}' in {path}")]
    MissingMetadata { path: String, field: String },

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Duplicate source tag: {0}")]
    DuplicateTag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CollateError>;
