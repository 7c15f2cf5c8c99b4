//! Error types for Management API calls.
//!
//! Every failure the crate surfaces is an [`Error`]. Variants keep the raw
//! response body and status where one exists so callers can inspect what the
//! server actually sent, and wrapped variants keep their cause reachable
//! through [`std::error::Error::source`].

use http::StatusCode;

/// The main error type for Management API calls.
///
/// # Examples
///
/// ```no_run
/// use storyblok_mapi::{Error, ManagementClient};
///
/// # async fn example() -> Result<(), Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .build()?;
///
/// match client.stories(12345).get(99).await?.data() {
///     Ok(story) => println!("{}", story.name()),
///     Err(Error::Format { resource, message }) => {
///         eprintln!("unexpected {resource} payload: {message}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded as JSON.
    #[error("Failed to decode response (status {status}): {serde_error}")]
    Decode {
        /// The raw response body that failed to decode
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The decoded payload does not have the shape the requested record expects.
    ///
    /// Raised when an envelope key such as `"story"` is missing, or when a
    /// collection key does not hold an array.
    #[error("Invalid {resource} payload: {message}")]
    Format {
        /// The resource the payload was decoded for
        resource: &'static str,
        /// What was wrong with the payload
        message: String,
    },

    /// A record failed its validity check at construction time.
    #[error("Invalid {resource}: {message}")]
    Validation {
        /// The resource that failed validation
        resource: &'static str,
        /// Which invariant was violated
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// The HTTP status code
        status: StatusCode,
        /// The server supplied message, or a canned message for the status
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The server kept answering 429 after the retry budget was spent.
    #[error("Rate limit exceeded after {attempts} attempts ({context})")]
    RateLimitExceeded {
        /// The number of attempts made, including the first one
        attempts: usize,
        /// Which page or item was being processed
        context: String,
    },

    /// A transport-level failure, wrapped with the operation it interrupted.
    #[error("Request failed ({context}): {source}")]
    Request {
        /// Which page or item was being processed
        context: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport-level retries were exhausted.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if a transport may retry after this error.
    ///
    /// Network errors, timeouts and 5xx responses are retryable. 429 is left
    /// to the bulk loops, which own their own retry budget.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyblok_mapi::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     message: "Server Error".to_string(),
    ///     raw_response: String::new(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::UNPROCESSABLE_ENTITY,
    ///     message: "Unprocessable Entity".to_string(),
    ///     raw_response: String::new(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Timeout => true,
            Error::Http { status, .. } => status.is_server_error(),
            Error::Request { source, .. } => source.is_retryable(),
            Error::Decode { .. }
            | Error::Format { .. }
            | Error::Validation { .. }
            | Error::RateLimitExceeded { .. }
            | Error::ConfigurationError(_)
            | Error::MaxRetriesExceeded { .. }
            | Error::SerializationFailed(_)
            | Error::InvalidUrl(_) => false,
        }
    }

    /// Returns `true` for a 429 response or an exhausted rate-limit budget.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::RateLimitExceeded { .. } => true,
            Error::Http { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS,
            _ => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Decode { status, .. } => Some(*status),
            Error::RateLimitExceeded { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Error::Request { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Http { raw_response, .. } => Some(raw_response),
            Error::Decode { raw_response, .. } => Some(raw_response),
            Error::Request { source, .. } => source.raw_response(),
            _ => None,
        }
    }

    pub(crate) fn format(resource: &'static str, message: impl Into<String>) -> Self {
        Error::Format {
            resource,
            message: message.into(),
        }
    }

    pub(crate) fn in_context(self, context: impl Into<String>) -> Self {
        Error::Request {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// A specialized `Result` type for Management API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_error_keeps_source() {
        let err = Error::Timeout.in_context("page 3");

        assert_eq!(err.to_string(), "Request failed (page 3): Request timed out");
        assert!(err.source().is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rate_limit_classification() {
        let err = Error::RateLimitExceeded {
            attempts: 4,
            context: "page 2".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_http_error_display_combines_status_and_message() {
        let err = Error::Http {
            status: StatusCode::NOT_FOUND,
            message: "This record could not be found".to_string(),
            raw_response: "{}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error 404 Not Found: This record could not be found"
        );
        assert_eq!(err.raw_response(), Some("{}"));
    }
}
