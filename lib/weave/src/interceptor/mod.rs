//! Ready-made interceptors.
//!
//! - [`DumpInterceptor`] - Logs full requests and responses using `tracing`
//! - [`NanToNullInterceptor`] - Rewrites `:NaN` to `:null` in response bodies
//!
//! Both plug into [`ClientBuilder::interceptor`](crate::ClientBuilder::interceptor)
//! or [`Client::add_interceptor`](crate::Client::add_interceptor):
//!
//! ```ignore
//! use weave::{Client, DumpInterceptor, NanToNullInterceptor};
//!
//! let client = Client::builder()
//!     .interceptor(DumpInterceptor::new())
//!     .interceptor(NanToNullInterceptor)
//!     .build()?;
//! ```

mod dump;
mod nan_to_null;

pub use dump::{DumpInterceptor, LogLevel};
pub use nan_to_null::NanToNullInterceptor;
