/// Errors that can occur while loading or normalizing platform records.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("unsupported input format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("platform {platform}: missing column {column}")]
    MissingColumn { platform: String, column: String },

    #[error("platform {platform}: no records")]
    EmptySource { platform: String },

    #[error("platform {platform}: malformed record at row {row}: {reason}")]
    MalformedRecord {
        platform: String,
        row: usize,
        reason: String,
    },

    #[error("platform {platform}: unmatched {kind} {value:?}")]
    Unmatched {
        platform: String,
        kind: &'static str,
        value: String,
    },

    #[error("failed to parse CSV")]
    Csv(#[from] csv::Error),

    #[error("failed to parse JSON")]
    Json(#[from] serde_json::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}
