//! Error types for the API client.

/// Errors that can occur when building queries or making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unexpected response).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API accepted the request but the body was unparseable or carried
    /// an error payload.
    #[error("API error: {message}")]
    Api { message: String },
    /// Caller input was malformed or a required precondition was not met.
    /// Raised before any network call is made.
    #[error("{0}")]
    Validation(String),
    /// The requested capability is not defined for this entity's category
    /// (e.g. subawards on an IDV).
    #[error("{0}")]
    Unsupported(String),
    /// A random-access index fell outside the result set.
    #[error("Index {index} out of range for query with {len} items")]
    IndexOutOfRange { index: i64, len: usize },
    /// The client configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
