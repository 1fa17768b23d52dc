//! Default [`Transport`] backed by the hyper-util connection pool.

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tracing::trace;

use crate::{
    Context, Error, Request, Response, Result, Transport, config::TransportConfig,
    connector::https_connector,
};

/// HTTP transport using hyper-util with connection pooling and TLS.
///
/// Every send honors the request [`Context`]: a cancelled context yields
/// [`Error::Cancelled`], an elapsed deadline or the configured timeout yields
/// [`Error::Timeout`]. Clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use weave::{HyperTransport, TransportConfig};
///
/// let transport = HyperTransport::with_config(
///     TransportConfig::builder()
///         .timeout(Duration::from_secs(5))
///         .build(),
/// );
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let connector = https_connector(config.connect_timeout);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();
        let detail = std::error::Error::source(&err)
            .map(ToString::to_string)
            .unwrap_or_default();

        if ["ssl", "tls", "certificate"]
            .iter()
            .any(|needle| msg.contains(needle) || detail.contains(needle))
        {
            return Error::tls(if detail.is_empty() { msg } else { detail });
        }

        Error::connection(if detail.is_empty() { msg } else { format!("{msg}: {detail}") })
    }

    async fn round_trip(&self, request: Request) -> Result<Response> {
        let hyper_request = Self::build_hyper_request(request)?;

        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }

    async fn send_with(&self, context: Context, request: Request) -> Result<Response> {
        if context.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if context.is_expired() {
            return Err(Error::Timeout);
        }

        let limit = context
            .remaining()
            .map_or(self.config.timeout, |left| left.min(self.config.timeout));
        trace!(method = %request.method(), url = %request.url(), ?limit, "sending request");

        tokio::select! {
            biased;
            () = context.cancelled() => Err(Error::Cancelled),
            result = tokio::time::timeout(limit, self.round_trip(request)) => {
                result.unwrap_or(Err(Error::Timeout))
            }
        }
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        let context = request.context().clone();
        self.send_with(context, request)
    }
}
