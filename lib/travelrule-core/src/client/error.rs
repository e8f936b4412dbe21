use std::time::Duration;

use super::auth::AuthenticationError;

/// Errors that can occur when using the [`ApiClient`](super::ApiClient).
///
/// The variants fall in four groups:
/// - validation (`MissingParameter`), raised before any network call
/// - serialization of request sub-objects (`SerializationError`)
/// - transport failures, surfaced as-is from the HTTP layer
/// - decoding of the response body (`JsonError`)
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    ReqwestError(reqwest::Error),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    HttpError(http::Error),

    /// Invalid base path configuration.
    ///
    /// Occurs when the base path cannot be parsed as a URI path.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Request signing failed.
    AuthenticationError(AuthenticationError),

    /// A mandatory parameter was not set on the service builder.
    ///
    /// Detected while assembling parameters, so no request is sent.
    #[display("Missing mandatory parameter '{name}'")]
    #[from(skip)]
    MissingParameter {
        /// The wire name of the missing parameter.
        name: &'static str,
    },

    /// A signed endpoint was called on a client configured without credentials.
    #[display("Signed endpoint '{path}' requires credentials")]
    #[from(skip)]
    MissingCredentials {
        /// The endpoint path.
        path: &'static str,
    },

    /// Data serialization failed.
    ///
    /// Occurs when a questionnaire cannot be encoded as JSON.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },

    /// JSON response deserialization failure.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// The JSON path where the error occurred.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// The exchange rejected the request with an error payload.
    #[display("API error {code} (HTTP {status_code}): {message}")]
    #[from(skip)]
    ApiError {
        /// The HTTP status code.
        status_code: u16,
        /// The exchange error code, e.g. `-1100`.
        code: i64,
        /// The exchange error message.
        message: String,
    },

    /// Server returned a non-success status without a recognizable error payload.
    #[display("Unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The unexpected HTTP status code received.
        status_code: u16,
        /// The response body for debugging.
        body: String,
    },

    /// The call did not complete within the configured timeout.
    #[display("Request timed out after {timeout:?}")]
    #[from(skip)]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },
}
