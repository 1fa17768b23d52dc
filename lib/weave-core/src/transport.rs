//! Transport trait.
//!
//! A [`Transport`] performs one network round trip: it receives a fully built
//! [`Request`] and returns the buffered [`Response`] or a transport error.
//! Connection pooling, TLS and DNS are the implementation's business.
//!
//! Implement it directly to plug in another HTTP stack or a test double.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// The raw send capability the client is layered on.
///
/// Implementations must honor the request [`Context`](crate::Context):
/// return [`Error::Cancelled`](crate::Error::Cancelled) when its token fires and
/// [`Error::Timeout`](crate::Error::Timeout) once its deadline passes.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use weave_core::{Request, Response, Result, Transport};
///
/// struct Echo;
///
/// impl Transport for Echo {
///     async fn send(&self, request: Request) -> Result<Response> {
///         let body = request.body().cloned().unwrap_or_default();
///         Ok(Response::new(200, HashMap::new(), body))
///     }
/// }
/// ```
pub trait Transport: Send + Sync + 'static {
    /// Send a request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the round trip fails:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts and cancellation
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        T::send(self, request)
    }
}
