use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, DdpgError>;

/// Main error type for the DDPG agent and its collaborators
#[derive(Debug, Error)]
pub enum DdpgError {
    /// Shapes of two arrays or parameter trees disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// A batch larger than the buffer contents was requested
    #[error("Cannot sample {requested} transitions from a buffer holding {available}")]
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// An agent operation was called out of order
    #[error("Episode not started: {0}")]
    EpisodeNotStarted(String),

    /// Training step could not be carried out
    #[error("Training error: {0}")]
    Training(String),

    /// Probability distribution could not be built
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// IO errors (checkpoints, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for DdpgError {
    fn from(err: bincode::Error) -> Self {
        DdpgError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DdpgError {
    fn from(err: serde_json::Error) -> Self {
        DdpgError::Serialization(err.to_string())
    }
}

impl From<rand_distr::NormalError> for DdpgError {
    fn from(err: rand_distr::NormalError) -> Self {
        DdpgError::Distribution(err.to_string())
    }
}

// Helper functions for common error patterns
impl DdpgError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DdpgError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DdpgError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
