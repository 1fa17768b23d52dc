//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use weave::prelude::*;
//! ```

pub use crate::{
    Chain, Client, ClientBuilder, ContentType, Context, Destination, DumpInterceptor, Error,
    ErrorResponse, HyperTransport, Interceptor, Method, NanToNullInterceptor, Next, Request,
    RequestBuilder, Response, Result, StatusCode, Transport, TransportConfig, from_fn, from_json,
    header, passthrough, to_json,
};
pub use serde::{Deserialize, Serialize};
