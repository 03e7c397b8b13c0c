use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two input streams an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Images,
    Labels,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Images => write!(f, "image stream"),
            Stream::Labels => write!(f, "label stream"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Truncated header in {stream}: expected {expected} bytes, got {got}")]
    TruncatedHeader {
        stream: Stream,
        expected: usize,
        got: usize,
    },

    #[error("Truncated record {index} in {stream}: expected {expected} bytes, got {got}")]
    TruncatedRecord {
        stream: Stream,
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("Record {index} has no counterpart: {exhausted} ended first")]
    UnpairedRecord { index: usize, exhausted: Stream },

    #[error("Label {label} of record {index} is out of range (expected 0-9)")]
    LabelOutOfRange { index: usize, label: u8 },

    #[error("Malformed row at line {line}: {reason}")]
    BadRow { line: usize, reason: RowError },

    #[error("No rows to work with")]
    EmptyData,

    #[error("Expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Invalid model file: {0}")]
    BadModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single text row was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} values, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("cannot parse {token:?} as a number")]
    NotANumber { token: String },

    #[error("input {column} = {value} is outside [0, 1]")]
    InputOutOfRange { column: usize, value: f32 },

    #[error("target is not a one-hot vector")]
    NotOneHot,
}

pub type Result<T> = std::result::Result<T, Error>;
