//! Transport adapter routing every send through the interceptor chain.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use tower_service::Service;
use tracing::trace;

use crate::chain::{Chain, Interceptor, Next, ServiceFuture};
use crate::{Error, Request, RequestHead, Response, Result, Transport};

/// Record the originating request on a response that does not carry one yet.
fn attach_request(response: Response, head: RequestHead) -> Response {
    if response.request().is_some() {
        response
    } else {
        response.with_request(head)
    }
}

/// Terminal handler of the chain: the raw transport's send.
struct Terminal<T> {
    transport: Arc<T>,
}

impl<T> Clone for Terminal<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Service<Request> for Terminal<T> {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let transport = Arc::clone(&self.transport);
        Box::pin(async move {
            let head = request.head();
            let response = transport.send(request).await?;
            Ok(attach_request(response, head))
        })
    }
}

/// A [`Transport`] that runs the current interceptor chain around another transport.
///
/// Clones share both the wrapped transport and the chain: an interceptor added
/// through any clone applies to every later call on all of them. The chain is
/// swapped atomically, so a call in flight keeps the chain it started with.
///
/// # Example
///
/// ```ignore
/// use weave::{HyperTransport, InterceptTransport, DumpInterceptor};
///
/// let transport = InterceptTransport::new(HyperTransport::new());
/// transport.add_interceptor(DumpInterceptor::new());
/// let response = transport.send(request).await?;
/// ```
pub struct InterceptTransport<T> {
    transport: Arc<T>,
    chain: Arc<ArcSwap<Chain>>,
}

impl<T> Clone for InterceptTransport<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<T> fmt::Debug for InterceptTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptTransport")
            .field("interceptors", &self.chain.load().len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> InterceptTransport<T> {
    /// Wrap a transport with an empty chain.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_chain(transport, Chain::new())
    }

    /// Wrap a transport with an initial chain.
    #[must_use]
    pub fn with_chain(transport: T, chain: Chain) -> Self {
        Self {
            transport: Arc::new(transport),
            chain: Arc::new(ArcSwap::from_pointee(chain)),
        }
    }

    /// Append an interceptor as the innermost link.
    ///
    /// The chain is recomposed and published for all subsequent sends.
    pub fn add_interceptor(&self, interceptor: impl Interceptor) {
        let interceptor: Arc<dyn Interceptor> = Arc::new(interceptor);
        let chain = self.chain.rcu(|current| {
            Chain::clone(current).with_shared(Arc::clone(&interceptor))
        });
        trace!(interceptors = chain.len() + 1, "interceptor added");
    }

    /// Snapshot of the current chain.
    #[must_use]
    pub fn chain(&self) -> Arc<Chain> {
        self.chain.load_full()
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.chain.load().len()
    }

    /// The wrapped transport.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.transport
    }

    fn terminal(&self) -> Next {
        Next::new(Terminal {
            transport: Arc::clone(&self.transport),
        })
    }
}

impl<T: Transport> Transport for InterceptTransport<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        let head = request.head();
        let chain = self.chain.load_full();
        let response = chain.run(request, self.terminal());
        async move { response.await.map(|response| attach_request(response, head)) }
    }
}
