use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};

/// A decorator wrapped around a handler.
///
/// The only required behaviour is [`Middleware::handle`], which receives the
/// rest of the chain as `next`. Its default implementation is built on the
/// simpler hooks:
///
/// 1. `before` runs first. Returning `Some(response)` short-circuits: inner
///    middleware and the handler are skipped.
/// 2. Otherwise `next` runs.
/// 3. `after` always runs, with the latency measured around steps 1 and 2.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &mut HandlerRequest) -> Option<HandlerResponse> {
        None
    }

    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}

    fn handle(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: &dyn Handler) {
        let start = Instant::now();
        match self.before(req) {
            Some(early) => *res = early,
            None => next.call(req, res),
        }
        self.after(req, res, start.elapsed());
    }
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn before(&self, req: &mut HandlerRequest) -> Option<HandlerResponse> {
        (**self).before(req)
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        (**self).after(req, res, latency)
    }

    fn handle(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: &dyn Handler) {
        (**self).handle(req, res, next)
    }
}

/// Middleware as stored on a route tree node
pub type SharedMiddleware = Arc<dyn Middleware>;

/// The remainder of a middleware chain, ending in the terminal handler.
///
/// Calling a `Next` built over `[M0, M1, .., Mn]` and `H` behaves like
/// `M0(M1(..Mn(H)..))`: `M0` is outermost and sees the request first and
/// the response last.
pub struct Next<'a> {
    middlewares: &'a [SharedMiddleware],
    endpoint: &'a dyn Handler,
}

impl Handler for Next<'_> {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        match self.middlewares.split_first() {
            Some((outer, rest)) => {
                let inner = Next {
                    middlewares: rest,
                    endpoint: self.endpoint,
                };
                outer.handle(req, res, &inner);
            }
            None => self.endpoint.call(req, res),
        }
    }
}

/// Compose `middlewares` (registration order) around `endpoint`.
///
/// The chain borrows both inputs, so building it allocates nothing; the
/// returned value is invoked like any other handler.
#[must_use]
pub fn compose<'a>(endpoint: &'a dyn Handler, middlewares: &'a [SharedMiddleware]) -> Next<'a> {
    Next {
        middlewares,
        endpoint,
    }
}

/// Middleware built from a closure, see [`from_fn`]
pub struct FnMiddleware<F> {
    f: F,
}

/// Turn a closure into middleware.
///
/// ```
/// use treerouter::dispatcher::Handler;
/// use treerouter::middleware::from_fn;
///
/// let served_by = from_fn(|req, res, next| {
///     next.call(req, res);
///     res.set_header("x-served-by", "treerouter");
/// });
/// # let _ = served_by;
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse, &dyn Handler) + Send + Sync,
{
    FnMiddleware { f }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse, &dyn Handler) + Send + Sync,
{
    fn handle(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: &dyn Handler) {
        (self.f)(req, res, next)
    }
}
