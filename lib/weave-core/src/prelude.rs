//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use weave_core::prelude::*;
//! ```

pub use crate::{
    ContentType, Context, Destination, Error, ErrorResponse, Method, Request, RequestBuilder,
    Response, Result, Transport, check_response, from_json, to_json,
};
