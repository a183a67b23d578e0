use thiserror::Error;

/// Data-validation failures raised at the input boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `created_at` (or another timestamp) is not RFC3339.
    #[error("record '{id}': invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        id: String,
        value: String,
        reason: String,
    },

    /// A transcript line is not a JSON object.
    #[error("transcript line {line}: {reason}")]
    MalformedTranscript { line: usize, reason: String },

    /// A transcript could not be written back out as JSON lines.
    #[error("transcript encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CoreError {
    pub fn invalid_timestamp(
        id: impl Into<String>,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidTimestamp {
            id: id.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
