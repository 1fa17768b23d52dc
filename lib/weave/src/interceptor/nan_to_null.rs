//! Interceptor repairing `NaN` values in JSON bodies.

use bytes::Bytes;

use crate::chain::{Interceptor, Next, ServiceFuture};
use crate::{Request, Response};

const NAN: &[u8] = b":NaN";
const NULL: &[u8] = b":null";

/// Rewrites `:NaN` to `:null` in every response body.
///
/// Some servers emit `{"ratio":NaN}`, which is not valid JSON. With this
/// interceptor in the chain such bodies decode with the field set to `null`.
/// A `Content-Length` header, when present, is updated to the new length.
#[derive(Debug, Clone, Copy, Default)]
pub struct NanToNullInterceptor;

/// Returns the rewritten body, or `None` when there is nothing to replace.
fn replace_nan(body: &[u8]) -> Option<Vec<u8>> {
    let mut rest = body;
    let mut out: Option<Vec<u8>> = None;

    while let Some(pos) = rest.windows(NAN.len()).position(|window| window == NAN) {
        let (head, tail) = rest.split_at(pos);
        let buffer = out.get_or_insert_with(|| Vec::with_capacity(body.len() + 8));
        buffer.extend_from_slice(head);
        buffer.extend_from_slice(NULL);
        rest = tail.get(NAN.len()..).unwrap_or_default();
    }

    out.map(|mut buffer| {
        buffer.extend_from_slice(rest);
        buffer
    })
}

fn repair(response: Response) -> Response {
    let Some(body) = replace_nan(response.body()) else {
        return response;
    };

    let length = body.len();
    let mut response = response.map_body(|_| Bytes::from(body));
    if response.header("Content-Length").is_some() {
        response.set_header("Content-Length", length.to_string());
    }
    response
}

impl Interceptor for NanToNullInterceptor {
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        Box::pin(async move { next.run(request).await.map(repair) })
    }
}
