//! Error types for permission loading

/// Failure to obtain an actor snapshot from a permission source
///
/// Denials are never errors: an evaluation that does not match is `false`.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Permission service unreachable: {0}")]
    Transport(String),
    #[error("Permission service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed permission snapshot: {0}")]
    Decode(String),
    #[error("No permissions found for actor {0}")]
    NotFound(String),
    #[error("Load #{ticket} was superseded by a newer load or invalidation")]
    Superseded { ticket: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether the failure came from a newer request winning the race
    ///
    /// A superseded load leaves the store untouched; it is not an error state.
    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchError::Superseded { .. })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
