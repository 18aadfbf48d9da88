use thiserror::Error;

/// Errors surfaced by configuration checks and dataset loading.
///
/// Matrix shape violations are not represented here: they are caller bugs
/// and panic at the offending operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("record {record}: expected {expected} fields, found {found}")]
    FieldCount {
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {record}, field {field}: cannot parse {token:?} as an integer")]
    Parse {
        record: usize,
        field: usize,
        token: String,
    },

    #[error("record {record}: label {label} is outside 0..{classes}")]
    LabelOutOfRange {
        record: usize,
        label: i64,
        classes: usize,
    },

    #[error("expected {expected} records, input ended after {found}")]
    MissingRecords { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
