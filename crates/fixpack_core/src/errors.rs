use std::path::PathBuf;
use thiserror::Error;

/// Structural violations. Any of these aborts the build before a byte is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate primary key {key}")]
    DuplicateKey { key: i64 },

    #[error("primary key {key} outside 1..{capacity}")]
    KeyOutOfRange { key: i64, capacity: usize },

    #[error("entity #{index} has no usable primary key `{field}`")]
    MissingKey { index: usize, field: &'static str },

    #[error("capacity {capacity} not in 2..={limit}")]
    BadCapacity { capacity: usize, limit: usize },

    #[error("heap `{heap}` offset {offset} does not fit a {bits}-bit reference")]
    OffsetOverflow { heap: &'static str, offset: usize, bits: u32 },

    #[error("{what} count {count} does not fit a u16 header")]
    CountOverflow { what: &'static str, count: usize },

    #[error("blob of {len} bytes does not fit a u16 length prefix")]
    BlobTooLarge { len: usize },
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO at {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("unexpected input shape: {0}")]
    Shape(String),

    #[error("config: {0}")]
    Config(String),

    #[error("Bad header in {0}")]
    BadHeader(PathBuf),
}

impl PackError {
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::IoAt { path: path.into(), source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PackError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
