use thiserror::Error;

use crate::models::Platform;

/// Errors raised while talking to a destination or validating its settings.
///
/// None of these reach the code being watched: the notifier logs them and
/// moves on.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport-level failure (connect, TLS, timeout, body decoding)
    #[error("HTTP request to {platform} failed")]
    Http {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },

    /// The destination answered with a non-success status code
    #[error("{platform} responded with HTTP {status}: {body}")]
    HttpStatus {
        platform: Platform,
        status: u16,
        body: String,
    },

    /// The destination accepted the request but reported an API error
    #[error("{platform} API error: {message}")]
    Api { platform: Platform, message: String },

    /// No channel was configured or passed for this message
    #[error("No {platform} channel specified. Skipping sending message to {platform}.")]
    MissingChannel { platform: Platform },

    /// No bot token was configured or found in the environment
    #[error("Missing {platform} bot token")]
    MissingToken { platform: Platform },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl NotifyError {
    pub fn http(platform: Platform, source: reqwest::Error) -> Self {
        NotifyError::Http { platform, source }
    }
}

/// Type alias for Result with NotifyError to simplify function signatures
pub type NotifyResult<T> = Result<T, NotifyError>;
