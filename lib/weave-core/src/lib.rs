//! Core types for the weave HTTP client.
//!
//! This crate provides the foundational types used by weave:
//! - [`Method`] - HTTP method enum
//! - [`Request`], [`RequestBuilder`] and [`RequestHead`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`Context`] - Cancellation token and deadline carried by every request
//! - [`Error`] and [`Result`] - Error handling
//! - [`Transport`] - The raw send capability
//! - [`check_response`] and [`ErrorResponse`] - Status classification
//! - [`Destination`] - Where a successful body is delivered
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)

mod body;
mod classify;
mod context;
mod destination;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;
mod transport;

pub use body::{ContentType, from_json, from_json_optional, to_json};
pub use classify::{
    ErrorDecoder, ErrorDetails, ErrorResponse, JsonErrorDecoder, check_response,
    check_response_with,
};
pub use context::Context;
pub use destination::{Destination, JsonTarget};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder, RequestHead};
pub use response::Response;
pub use transport::Transport;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};

// Re-export for custom cancellation tokens
pub use tokio_util::sync::CancellationToken;
