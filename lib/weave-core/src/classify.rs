//! Response classification.
//!
//! [`check_response`] turns a completed [`Response`] into either the same
//! response (status 200..=299) or an [`Error::Status`] carrying an
//! [`ErrorResponse`]. The message of an error response comes from an
//! [`ErrorDecoder`]; when the decoder finds nothing, the raw body text is used.

use std::fmt;

use crate::{Error, RequestHead, Response, Result};

/// Message and request id extracted from an error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetails {
    /// Human readable message.
    pub message: Option<String>,
    /// Request correlation identifier.
    pub request_id: Option<String>,
}

/// Trait for extracting structured details from non-2xx responses.
///
/// # Example
///
/// ```
/// use weave_core::{ErrorDecoder, ErrorDetails, Response};
///
/// struct StatusLineDecoder;
///
/// impl ErrorDecoder for StatusLineDecoder {
///     fn decode(&self, response: &Response) -> Option<ErrorDetails> {
///         Some(ErrorDetails {
///             message: Some(format!("upstream answered {}", response.status())),
///             request_id: None,
///         })
///     }
/// }
/// ```
pub trait ErrorDecoder: Send + Sync + 'static {
    /// Extract details from an error response.
    ///
    /// Returning `None`, or details without a message, falls back to the raw body text.
    fn decode(&self, response: &Response) -> Option<ErrorDetails>;
}

/// Default decoder: reads `{"message": .., "request_id": ..}` JSON bodies.
///
/// `error` is accepted in place of `message`, and `requestId` in place of
/// `request_id`. Without an id in the body, the `X-Request-Id` header is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorDecoder;

// Spellings are separate fields: bodies may carry both `error` and `message`.
#[derive(serde::Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default, rename = "requestId")]
    request_id_camel: Option<String>,
}

impl ErrorDecoder for JsonErrorDecoder {
    fn decode(&self, response: &Response) -> Option<ErrorDetails> {
        let (message, request_id) = serde_json::from_slice::<ErrorPayload>(response.body())
            .map_or((None, None), |payload| {
                (
                    payload.message.or(payload.error),
                    payload.request_id.or(payload.request_id_camel),
                )
            });
        let request_id =
            request_id.or_else(|| response.header("X-Request-Id").map(str::to_owned));
        Some(ErrorDetails {
            message,
            request_id,
        })
    }
}

/// Structured failure for a response outside the 2xx range.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    response: Response,
    message: String,
    request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates an error response.
    #[must_use]
    pub fn new(response: Response, message: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            response,
            message: message.into(),
            request_id,
        }
    }

    /// The raw response.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Consume into the raw response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.status()
    }

    /// The originating request, when known.
    #[must_use]
    pub const fn request(&self) -> Option<&RequestHead> {
        self.response.request()
    }

    /// Error message (structured, or the raw body text).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Request correlation identifier.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(request) = self.request() {
            write!(f, "{} {}: ", request.method(), request.url())?;
        }
        write!(f, "{}", self.status())?;
        if let Some(id) = &self.request_id {
            write!(f, " (request {id:?})")?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

/// Classify a response with the default [`JsonErrorDecoder`].
///
/// # Errors
///
/// Returns [`Error::Status`] for any status outside 200..=299.
pub fn check_response(response: Response) -> Result<Response> {
    check_response_with(&JsonErrorDecoder, response)
}

/// Classify a response with a custom [`ErrorDecoder`].
///
/// # Errors
///
/// Returns [`Error::Status`] for any status outside 200..=299.
pub fn check_response_with<D>(decoder: &D, response: Response) -> Result<Response>
where
    D: ErrorDecoder + ?Sized,
{
    if response.is_success() {
        return Ok(response);
    }

    let details = decoder.decode(&response).unwrap_or_default();
    // The body is already buffered, undecodable bytes degrade to replacement characters.
    let message = details
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(response.body()).into_owned());
    let request_id = details.request_id.filter(|id| !id.is_empty());

    Err(Error::from(ErrorResponse::new(response, message, request_id)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use bytes::Bytes;

    use super::*;
    use crate::Method;

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(status, HashMap::new(), Bytes::from_static(body.as_bytes()))
    }

    fn with_head(response: Response) -> Response {
        let url = url::Url::parse("https://api.example.com/users/42").expect("url");
        response.with_request(RequestHead::new(Method::Get, url))
    }

    #[test]
    fn success_range_passes() {
        for status in [200, 201, 204, 250, 299] {
            let result = check_response(response(status, "ignored"));
            check!(result.is_ok(), "status {status} should pass");
        }
    }

    #[test]
    fn outside_success_range_fails_with_raw_body() {
        for status in [100, 199, 300, 302, 399, 400, 404, 499, 500, 503, 599] {
            let result = check_response(response(status, "test msg"));
            let_assert!(Err(Error::Status(err)) = result);
            check!(err.status() == status);
            check!(err.message() == "test msg");
            check!(err.request_id().is_none());
        }
    }

    #[test]
    fn structured_body_populates_message_and_id() {
        let result = check_response(response(
            422,
            r#"{"message":"name is required","request_id":"req-1"}"#,
        ));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == "name is required");
        check!(err.request_id() == Some("req-1"));
    }

    #[test]
    fn alternate_field_names_are_accepted() {
        let result = check_response(response(400, r#"{"error":"bad","requestId":"r-9"}"#));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == "bad");
        check!(err.request_id() == Some("r-9"));
    }

    #[test]
    fn both_spellings_in_one_body_prefer_message_and_request_id() {
        let result = check_response(response(
            400,
            r#"{"error":"Bad Request","message":"name is required","request_id":"r1","requestId":"r2"}"#,
        ));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == "name is required");
        check!(err.request_id() == Some("r1"));
    }

    #[test]
    fn json_without_message_falls_back_to_body() {
        let body = r#"{"code":17}"#;
        let result = check_response(response(500, body));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == body);
    }

    #[test]
    fn request_id_header_is_used_when_body_has_none() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "hdr-7".to_string());
        let raw = Response::new(503, headers, Bytes::from_static(br#"{"message":"down"}"#));

        let result = check_response(raw);
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.request_id() == Some("hdr-7"));
    }

    #[test]
    fn invalid_utf8_body_is_lossy() {
        let raw = Response::new(500, HashMap::new(), Bytes::from_static(b"oops\xff"));
        let result = check_response(raw);
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == "oops\u{fffd}");
    }

    #[test]
    fn custom_decoder_is_used() {
        struct Fixed;

        impl ErrorDecoder for Fixed {
            fn decode(&self, _response: &Response) -> Option<ErrorDetails> {
                Some(ErrorDetails {
                    message: Some("fixed".to_string()),
                    request_id: Some("id".to_string()),
                })
            }
        }

        let result = check_response_with(&Fixed, response(404, "ignored"));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.message() == "fixed");
        check!(err.request_id() == Some("id"));
    }

    #[test]
    fn raw_response_is_kept() {
        let result = check_response(with_head(response(404, "missing")));
        let response = result.expect_err("404").into_response().expect("raw");
        check!(response.status() == 404);
        check!(response.body().as_ref() == b"missing");
    }

    #[test]
    fn render_with_request() {
        let err = check_response(with_head(response(404, "not found"))).expect_err("404");
        insta::assert_snapshot!(err.to_string(), @"GET https://api.example.com/users/42: 404 not found");
    }

    #[test]
    fn render_with_request_id() {
        let err = check_response(with_head(response(
            500,
            r#"{"message":"boom","request_id":"abc"}"#,
        )))
        .expect_err("500");
        insta::assert_snapshot!(err.to_string(), @r#"GET https://api.example.com/users/42: 500 (request "abc") boom"#);
    }

    #[test]
    fn render_with_empty_body() {
        let err = check_response(with_head(response(502, ""))).expect_err("502");
        insta::assert_snapshot!(err.to_string(), @"GET https://api.example.com/users/42: 502");
    }
}
