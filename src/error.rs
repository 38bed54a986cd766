use thiserror::Error;

/// Main error type for the analytics service
#[derive(Error, Debug)]
pub enum NbaError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Lookup / request errors
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    // Model errors
    #[error("Model error: {0}")]
    Model(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for NbaError
pub type Result<T> = std::result::Result<T, NbaError>;

impl NbaError {
    pub fn not_found(what: impl Into<String>) -> Self {
        NbaError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        NbaError::Validation(msg.into())
    }

    /// True for errors caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NbaError::NotFound(_) | NbaError::Validation(_) | NbaError::Conflict(_)
        )
    }
}
