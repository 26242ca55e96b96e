use thiserror::Error;

#[derive(Debug, Error)]
pub enum KaizenError {
    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    #[error("feature '{0}' is not active")]
    FeatureNotActive(String),

    #[error("invalid feature name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidFeatureName(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KaizenError>;
