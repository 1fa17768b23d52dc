//! Request/response dump interceptor.
//!
//! Logs every outgoing request and every response with the `tracing` crate,
//! headers and bodies included. Nothing is altered on the way through.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::chain::{Interceptor, Next, ServiceFuture};
use crate::{Request, Response};

/// Level the dumps are emitted at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Emit dumps as `DEBUG` events.
    #[default]
    Debug,
    /// Emit dumps as `INFO` events.
    Info,
}

/// Interceptor that logs full requests and responses.
///
/// Each call runs in an `http_request` span carrying the method and URL.
/// Transport failures are logged at `WARN` and returned unchanged.
///
/// # Example
///
/// ```ignore
/// use weave::{Client, DumpInterceptor, LogLevel};
///
/// let client = Client::builder()
///     .interceptor(DumpInterceptor::with_level(LogLevel::Info))
///     .build()?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpInterceptor {
    level: LogLevel,
}

impl DumpInterceptor {
    /// Dump at `DEBUG` level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump at the given level.
    #[must_use]
    pub const fn with_level(level: LogLevel) -> Self {
        Self { level }
    }

    /// The level dumps are emitted at.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

fn lossy(body: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(body)
}

fn dump_request(level: LogLevel, request: &Request) {
    let headers: &HashMap<String, String> = request.headers();
    let body = request.body().map(|body| lossy(body)).unwrap_or_default();
    match level {
        LogLevel::Debug => debug!(?headers, body = ?body, "request"),
        LogLevel::Info => info!(?headers, body = ?body, "request"),
    }
}

fn dump_response(level: LogLevel, response: &Response, elapsed_ms: u64) {
    let status = response.status();
    let headers = response.headers();
    let body = lossy(response.body());
    match level {
        LogLevel::Debug => debug!(status, elapsed_ms, ?headers, body = ?body, "response"),
        LogLevel::Info => info!(status, elapsed_ms, ?headers, body = ?body, "response"),
    }
}

impl Interceptor for DumpInterceptor {
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;

        let span = info_span!("http_request", %method, %url);

        Box::pin(
            async move {
                let start = Instant::now();
                dump_request(level, &request);

                let result = next.run(request).await;

                // Saturating conversion to u64
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) => dump_response(level, response, elapsed_ms),
                    Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}
