//! Error types for weave.
//!
//! Failures fall into four kinds, each kept distinct so callers can tell them apart:
//!
//! - construction: [`Error::InvalidUrl`], [`Error::InvalidRequest`], [`Error::JsonSerialization`]
//! - transport: [`Error::Connection`], [`Error::Tls`], [`Error::Timeout`], [`Error::Cancelled`]
//! - classification: [`Error::Status`] (non-2xx response)
//! - decode: [`Error::JsonDeserialization`], [`Error::Io`]

use bytes::Bytes;
use derive_more::{Display, Error, From};

use crate::{ErrorResponse, Response};

/// Main error type for weave operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Non-2xx response, with the raw response attached.
    #[display("{_0}")]
    #[from(skip)]
    Status(#[error(not(source))] Box<ErrorResponse>),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout or elapsed deadline.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The call context was cancelled.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing or resolution error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Writing the response body to a raw sink failed.
    #[display("body write error: {_0}")]
    #[from]
    Io(std::io::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<ErrorResponse> for Error {
    fn from(response: ErrorResponse) -> Self {
        Self::Status(Box::new(response))
    }
}

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if the call context was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` for failures raised by the transport itself.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Tls(_) | Self::Timeout | Self::Cancelled
        )
    }

    /// Returns `true` for request construction failures.
    #[must_use]
    pub const fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::InvalidRequest(_) | Self::JsonSerialization(_)
        )
    }

    /// Returns `true` for response decoding failures.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::JsonDeserialization { .. } | Self::Io(_))
    }

    /// The classified error response, if this is a status error.
    #[must_use]
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Status(response) => Some(&**response),
            _ => None,
        }
    }

    /// Consume into the raw response of a status error.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Status(response) => Some((*response).into_response()),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.error_response().map(ErrorResponse::status)
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns the response body if this is a status error.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.error_response().map(|e| e.response().body())
    }

    /// Try to decode the status error body as JSON.
    ///
    /// Returns `None` if this is not a status error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiError {
    ///     code: String,
    /// }
    ///
    /// if let Some(Ok(api_error)) = err.decode_body::<ApiError>() {
    ///     println!("API error: {}", api_error.code);
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
