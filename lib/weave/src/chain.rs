//! Interceptor chain composition.
//!
//! An [`Interceptor`] wraps the rest of the chain: it receives the request and
//! a [`Next`] handle, and decides whether (and how) to call it. A [`Chain`]
//! composes an ordered list of interceptors into a single interceptor with
//! onion ordering:
//!
//! ```text
//! I1 enter → I2 enter → … → In enter → terminal → In exit → … → I2 exit → I1 exit
//! ```
//!
//! The nested handler is rebuilt on every call by folding from the terminal
//! handler outward, so a chain never holds stale links.
//!
//! # Example
//!
//! ```ignore
//! use weave::{Chain, Next, from_fn};
//!
//! let chain = Chain::new()
//!     .with(from_fn(|mut request, next: Next| async move {
//!         request.set_header("X-Trace", "on");
//!         next.run(request).await
//!     }))
//!     .with(from_fn(|request, next: Next| async move {
//!         let response = next.run(request).await?;
//!         Ok(response)
//!     }));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::ServiceExt;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::{Error, Request, Response, Result};

/// Type-erased service for the links of a chain.
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future returned by interceptors and links.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Request/response middleware.
///
/// An interceptor may mutate the request before calling [`Next::run`], skip
/// `next` entirely to short-circuit the chain, and inspect or replace the
/// response or error afterwards. A short-circuiting interceptor owns the
/// release of whatever it acquired itself.
pub trait Interceptor: Send + Sync + 'static {
    /// Handle `request`, usually by delegating to `next`.
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture;
}

impl<I: Interceptor + ?Sized> Interceptor for Arc<I> {
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        (**self).intercept(request, next)
    }
}

/// The remainder of a chain, as seen by one interceptor.
///
/// Consumed by [`run`](Self::run), so it can be invoked at most once.
/// `Next` is not `Clone`:
///
/// ```compile_fail
/// use weave::{Next, Request, from_fn};
///
/// let twice = from_fn(|request: Request, next: Next| async move {
///     let retry = request.clone();
///     let _ = next.clone().run(request).await;
///     next.run(retry).await
/// });
/// ```
pub struct Next {
    service: BoxedService,
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

impl Next {
    /// Wrap a tower service as the next handler.
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        Self {
            service: BoxCloneService::new(service),
        }
    }

    /// Wrap an async closure as a terminal handler.
    pub fn from_fn<F, Fut>(handler: F) -> Self
    where
        F: FnMut(Request) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        Self::new(tower::service_fn(handler))
    }

    /// Invoke the rest of the chain.
    pub fn run(self, request: Request) -> ServiceFuture {
        Box::pin(self.service.oneshot(request))
    }

    fn into_service(self) -> BoxedService {
        self.service
    }
}

/// A chain link: one interceptor in front of the rest of the chain.
#[derive(Clone)]
struct Link {
    interceptor: Arc<dyn Interceptor>,
    next: BoxedService,
}

impl Service<Request> for Link {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // Readiness of `next` is polled when the interceptor runs it.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let next = Next {
            service: self.next.clone(),
        };
        self.interceptor.intercept(request, next)
    }
}

/// An ordered sequence of interceptors, itself usable as one [`Interceptor`].
///
/// Composition is pure: a chain holds no resources and performs no I/O.
#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

impl Chain {
    /// An empty chain, equivalent to [`passthrough`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a chain with `interceptor` appended as the innermost link.
    #[must_use]
    pub fn with(self, interceptor: impl Interceptor) -> Self {
        self.with_shared(Arc::new(interceptor))
    }

    /// Like [`with`](Self::with), for an already shared interceptor.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain has no interceptor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Nest the interceptors around `terminal`, last interceptor innermost.
    fn wrap(&self, terminal: BoxedService) -> BoxedService {
        self.interceptors
            .iter()
            .rev()
            .fold(terminal, |next, interceptor| {
                BoxCloneService::new(Link {
                    interceptor: Arc::clone(interceptor),
                    next,
                })
            })
    }

    /// Run `request` through every interceptor, then `terminal`.
    pub fn run(&self, request: Request, terminal: Next) -> ServiceFuture {
        let service = self.wrap(terminal.into_service());
        Box::pin(service.oneshot(request))
    }
}

impl Interceptor for Chain {
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        self.run(request, next)
    }
}

/// Compose interceptors into one [`Chain`], first item outermost.
#[must_use]
pub fn compose<I>(interceptors: I) -> Chain
where
    I: IntoIterator<Item = Arc<dyn Interceptor>>,
{
    interceptors
        .into_iter()
        .fold(Chain::new(), Chain::with_shared)
}

/// The identity interceptor: forwards the request unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Interceptor for Passthrough {
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        next.run(request)
    }
}

/// Returns the identity interceptor.
#[must_use]
pub const fn passthrough() -> Passthrough {
    Passthrough
}

/// Interceptor built from an async closure, see [`from_fn`].
#[derive(Clone)]
pub struct FnInterceptor<F> {
    f: F,
}

impl<F> fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor").finish_non_exhaustive()
    }
}

/// Build an interceptor from an async closure taking the request and [`Next`].
///
/// ```ignore
/// let stamp = weave::from_fn(|mut request, next: weave::Next| async move {
///     request.set_header("X-Client", "weave");
///     next.run(request).await
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnInterceptor<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    FnInterceptor { f }
}

impl<F, Fut> Interceptor for FnInterceptor<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn intercept(&self, request: Request, next: Next) -> ServiceFuture {
        Box::pin((self.f)(request, next))
    }
}
