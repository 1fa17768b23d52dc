//! HTTP client with a composable request/response interceptor chain.
//!
//! Requests flow through an ordered chain of [`Interceptor`]s before reaching
//! the [`Transport`]; responses flow back in reverse order. The [`Client`]
//! adds base URL resolution, default headers, JSON bodies and response
//! classification on top.
//!
//! # Example
//!
//! ```ignore
//! use weave::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = Client::builder()
//!     .base_url("https://api.example.com/")
//!     .interceptor(DumpInterceptor::new())
//!     .build()?;
//!
//! let user: Option<User> = client.get("users/42").await?;
//!
//! // Interceptors added later apply to every following request.
//! client.add_interceptor(NanToNullInterceptor);
//! ```

mod chain;
mod client;
mod config;
mod connector;
mod hyper_transport;
pub mod interceptor;
pub mod prelude;
mod transport;

pub use chain::{
    BoxedService, Chain, FnInterceptor, Interceptor, Next, Passthrough, ServiceFuture, compose,
    from_fn, passthrough,
};
pub use client::{Client, ClientBuilder, DEFAULT_USER_AGENT, get, post};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use hyper_transport::HyperTransport;
pub use interceptor::{DumpInterceptor, LogLevel, NanToNullInterceptor};
pub use transport::InterceptTransport;

// Re-export core types
pub use weave_core::{
    CancellationToken, ContentType, Context, Destination, Error, ErrorDecoder, ErrorDetails,
    ErrorResponse, JsonErrorDecoder, JsonTarget, Method, Request, RequestBuilder, RequestHead,
    Response, Result, Transport, check_response, check_response_with, from_json,
    from_json_optional, to_json,
};

// Re-export http types for status codes and headers
pub use weave_core::{StatusCode, header};

pub use url;
