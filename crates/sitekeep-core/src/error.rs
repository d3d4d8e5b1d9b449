use thiserror::Error;

/// Application-wide error types for sitekeep.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Image decode or encode failed.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true for failures scoped to a single request.
    ///
    /// These never abort a run: the localizer skips the reference and the
    /// link checker records the URL as broken.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::InvalidUrl(_)
        )
    }
}
