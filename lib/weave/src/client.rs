//! The high-level HTTP client.
//!
//! A [`Client`] resolves targets against an optional base URL, applies default
//! headers, serializes JSON bodies, sends requests through its interceptor
//! chain, classifies the response and finally delivers the body to a
//! [`Destination`].
//!
//! # Example
//!
//! ```ignore
//! use weave::{Client, Context, Destination, DumpInterceptor, Method};
//!
//! let client = Client::builder()
//!     .base_url("https://api.example.com/v1/")
//!     .authorization_with_scheme("secret", "Bearer")
//!     .interceptor(DumpInterceptor::new())
//!     .build()?;
//!
//! let request = client.build_request(Method::Post, "users", Some(&new_user))?;
//! let mut created = User::default();
//! client
//!     .execute(Context::background(), request, Destination::json(&mut created))
//!     .await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::chain::{Interceptor, compose};
use crate::transport::InterceptTransport;
use crate::{
    ContentType, Context, Destination, Error, ErrorDecoder, HyperTransport, JsonErrorDecoder,
    Method, Request, Response, Result, Transport, check_response_with, from_json_optional,
    to_json,
};

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("weave/", env!("CARGO_PKG_VERSION"));

fn set_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// HTTP client with default headers, base URL resolution and an interceptor chain.
///
/// Clones share the transport and its interceptor chain, but each clone owns
/// its base URL and default headers.
pub struct Client<T = HyperTransport> {
    transport: InterceptTransport<T>,
    base_url: Option<Url>,
    headers: HashMap<String, String>,
    error_decoder: Arc<dyn ErrorDecoder>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
            error_decoder: Arc::clone(&self.error_decoder),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// A client over a default [`HyperTransport`], without base URL.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().assemble(None)
    }

    /// Create a builder over a default [`HyperTransport`].
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new(HyperTransport::new())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    /// Create a builder over a custom transport.
    #[must_use]
    pub fn builder_with(transport: T) -> ClientBuilder<T> {
        ClientBuilder::new(transport)
    }

    /// The base URL relative targets are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Default headers applied to every built request.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Set a default header, replacing a previous value regardless of name case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_header(&mut self.headers, name.into(), value.into());
    }

    /// Set the `Authorization` default header to `value`, verbatim.
    pub fn set_authorization(&mut self, value: impl Into<String>) {
        self.set_header("Authorization", value);
    }

    /// Append an interceptor as the innermost link of the shared chain.
    ///
    /// Requests already in flight are not affected.
    pub fn add_interceptor(&self, interceptor: impl Interceptor) {
        self.transport.add_interceptor(interceptor);
    }

    /// The chain-aware transport used by this client.
    #[must_use]
    pub const fn transport(&self) -> &InterceptTransport<T> {
        &self.transport
    }

    /// Resolve `target` against the base URL.
    ///
    /// Relative targets follow RFC 3986: `http://h/api/` joined with `user`
    /// gives `http://h/api/user`, while a base without a trailing slash has
    /// its last segment replaced. Without a base URL, `target` must be absolute.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        let url = match &self.base_url {
            Some(base) => base.join(target)?,
            None => Url::parse(target)?,
        };
        Ok(url)
    }

    /// Build a request with the default headers and an optional JSON body.
    pub fn build_request<B>(&self, method: Method, target: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        self.build_request_with_headers(method, target, body, std::iter::empty::<(String, String)>())
    }

    /// Like [`build_request`](Self::build_request), with per-request headers
    /// that win over the defaults.
    ///
    /// Headers are applied as defaults first, then the body `Content-Type`,
    /// then `overrides`.
    pub fn build_request_with_headers<B, H, K, V>(
        &self,
        method: Method,
        target: &str,
        body: Option<&B>,
        overrides: H,
    ) -> Result<Request>
    where
        B: Serialize + ?Sized,
        H: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let url = self.resolve(target)?;
        let mut builder = Request::builder(method, url).headers(self.headers.clone());

        if let Some(body) = body {
            builder = builder
                .header("Content-Type", ContentType::Json.as_str())
                .body(to_json(body)?);
        }

        let builder = builder.headers(
            overrides
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        Ok(builder.build())
    }

    /// Send `request` under `context` and deliver the body to `destination`.
    ///
    /// Transport failures are returned unchanged. A non-2xx response becomes
    /// [`Error::Status`]. On success the body is written to `destination`; an
    /// empty body leaves a JSON target untouched.
    pub async fn execute(
        &self,
        context: Context,
        mut request: Request,
        destination: Destination<'_>,
    ) -> Result<Response> {
        request.set_context(context);
        trace!(method = %request.method(), url = %request.url(), "executing request");

        let response = self.transport.send(request).await?;
        let response = check_response_with(&*self.error_decoder, response)?;
        destination.write_body(response.body())?;
        Ok(response)
    }

    async fn call<B, R>(&self, method: Method, target: &str, body: Option<&B>) -> Result<Option<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, target, body)?;
        let response = self
            .execute(Context::background(), request, Destination::Discard)
            .await?;
        from_json_optional(response.body())
    }

    /// `GET` `target` and decode the JSON body, `None` when empty.
    pub async fn get<R: DeserializeOwned>(&self, target: &str) -> Result<Option<R>> {
        self.call::<(), R>(Method::Get, target, None).await
    }

    /// `POST` `body` as JSON to `target` and decode the JSON answer, `None` when empty.
    pub async fn post<B, R>(&self, target: &str, body: &B) -> Result<Option<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(Method::Post, target, Some(body)).await
    }

    /// `PUT` `body` as JSON to `target` and decode the JSON answer, `None` when empty.
    pub async fn put<B, R>(&self, target: &str, body: &B) -> Result<Option<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(Method::Put, target, Some(body)).await
    }

    /// `DELETE` `target` and decode the JSON answer, `None` when empty.
    pub async fn delete<R: DeserializeOwned>(&self, target: &str) -> Result<Option<R>> {
        self.call::<(), R>(Method::Delete, target, None).await
    }
}

/// `GET` an absolute URL with a default client.
///
/// ```ignore
/// let user: Option<User> = weave::get("https://api.example.com/users/42").await?;
/// ```
pub async fn get<R: DeserializeOwned>(url: &str) -> Result<Option<R>> {
    Client::new().get(url).await
}

/// `POST` JSON to an absolute URL with a default client.
pub async fn post<B, R>(url: &str, body: &B) -> Result<Option<R>>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    Client::new().post(url, body).await
}

/// Builder for [`Client`].
///
/// Options are recorded in call order and validated by [`build`](Self::build).
pub struct ClientBuilder<T = HyperTransport> {
    transport: T,
    base_url: Option<String>,
    headers: HashMap<String, String>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    error_decoder: Arc<dyn ErrorDecoder>,
}

impl<T> fmt::Debug for ClientBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("interceptors_count", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ClientBuilder<T> {
    fn new(transport: T) -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_owned(), DEFAULT_USER_AGENT.to_owned());
        Self {
            transport,
            base_url: None,
            headers,
            interceptors: Vec::new(),
            error_decoder: Arc::new(JsonErrorDecoder),
        }
    }

    /// Resolve relative targets against `url`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the default `User-Agent`.
    #[must_use]
    pub fn user_agent(self, user_agent: impl Into<String>) -> Self {
        self.header("User-Agent", user_agent)
    }

    /// Send `value` as the `Authorization` header, verbatim.
    #[must_use]
    pub fn authorization(self, value: impl Into<String>) -> Self {
        self.header("Authorization", value)
    }

    /// Send `Authorization: {scheme} {token}`.
    #[must_use]
    pub fn authorization_with_scheme(self, token: impl AsRef<str>, scheme: impl AsRef<str>) -> Self {
        let value = format!("{} {}", scheme.as_ref(), token.as_ref());
        self.authorization(value)
    }

    /// Add a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Append an interceptor; the first one added is the outermost.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Use a custom decoder for non-2xx bodies.
    #[must_use]
    pub fn error_decoder(mut self, decoder: impl ErrorDecoder) -> Self {
        self.error_decoder = Arc::new(decoder);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when the base URL does not parse or
    /// cannot be used as a base.
    pub fn build(mut self) -> Result<Client<T>> {
        let base_url = self
            .base_url
            .take()
            .map(|raw| parse_base_url(&raw))
            .transpose()?;
        Ok(self.assemble(base_url))
    }

    fn assemble(self, base_url: Option<Url>) -> Client<T> {
        let chain = compose(self.interceptors);
        trace!(interceptors = chain.len(), "building client");
        Client {
            transport: InterceptTransport::with_chain(self.transport, chain),
            base_url,
            headers: self.headers,
            error_decoder: self.error_decoder,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(
            url::ParseError::RelativeUrlWithCannotBeABaseBase,
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    struct NoNetwork;

    impl Transport for NoNetwork {
        async fn send(&self, _request: Request) -> Result<Response> {
            Err(Error::connection("no network in unit tests"))
        }
    }

    fn client(base_url: Option<&str>) -> Client<NoNetwork> {
        let builder = Client::builder_with(NoNetwork);
        let builder = match base_url {
            Some(url) => builder.base_url(url),
            None => builder,
        };
        builder.build().expect("client")
    }

    #[test]
    fn resolve_joins_relative_target() {
        let client = client(Some("http://h/api/"));
        let url = client.resolve("user").expect("url");
        assert_eq!(url.as_str(), "http://h/api/user");
    }

    #[test]
    fn resolve_replaces_last_segment_without_trailing_slash() {
        let client = client(Some("http://h/api"));
        let url = client.resolve("user").expect("url");
        assert_eq!(url.as_str(), "http://h/user");
    }

    #[test]
    fn resolve_requires_absolute_without_base() {
        let client = client(None);

        let err = client.resolve("user").expect_err("relative");
        assert!(matches!(err, Error::InvalidUrl(_)));

        let url = client.resolve("http://h/user").expect("absolute");
        assert_eq!(url.as_str(), "http://h/user");
    }

    #[test]
    fn build_rejects_bad_base_url() {
        let err = Client::builder_with(NoNetwork)
            .base_url("not a url")
            .build()
            .expect_err("invalid");
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = Client::builder_with(NoNetwork)
            .base_url("mailto:someone@example.com")
            .build()
            .expect_err("cannot be a base");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn default_headers_are_applied() {
        let mut client = client(Some("http://h/"));
        client.set_authorization("token abc");

        let request = client
            .build_request::<()>(Method::Get, "x", None)
            .expect("request");

        assert_eq!(request.header("user-agent"), Some(DEFAULT_USER_AGENT));
        assert_eq!(request.header("Authorization"), Some("token abc"));
        assert_eq!(request.header("Content-Type"), None);
        assert!(request.body().is_none());
    }

    #[test]
    fn overrides_win_over_defaults() {
        let client = Client::builder_with(NoNetwork)
            .base_url("http://h/")
            .header("X-Tenant", "default")
            .build()
            .expect("client");

        let request = client
            .build_request_with_headers::<(), _, _, _>(
                Method::Get,
                "x",
                None,
                [("x-tenant", "acme"), ("User-Agent", "custom/1.0")],
            )
            .expect("request");

        assert_eq!(request.header("X-Tenant"), Some("acme"));
        assert_eq!(request.header("user-agent"), Some("custom/1.0"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn json_body_sets_content_type() {
        let client = client(Some("http://h/"));
        let body = serde_json::json!({ "name": "Ada" });

        let request = client
            .build_request(Method::Post, "users", Some(&body))
            .expect("request");

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body(),
            Some(&Bytes::from_static(br#"{"name":"Ada"}"#))
        );
    }

    #[test]
    fn clones_own_their_headers() {
        let original = client(None);
        let mut cloned = original.clone();
        cloned.set_header("X-Only-Clone", "1");

        assert!(cloned.headers().contains_key("X-Only-Clone"));
        assert!(!original.headers().contains_key("X-Only-Clone"));
    }

    #[test]
    fn authorization_with_scheme_renders_scheme_first() {
        let client = Client::builder_with(NoNetwork)
            .authorization_with_scheme("abc", "Bearer")
            .build()
            .expect("client");

        assert_eq!(
            client.headers().get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[tokio::test]
    async fn transport_errors_are_returned_unchanged() {
        let client = client(None);
        let request = client
            .build_request::<()>(Method::Get, "http://h/", None)
            .expect("request");

        let err = client
            .execute(Context::background(), request, Destination::Discard)
            .await
            .expect_err("no network");

        assert!(err.is_connection());
    }
}
