use std::time::Instant;

use tracing::{field, info, info_span};

use super::Middleware;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};

/// Opens an `info` span around the rest of the chain.
///
/// The span carries the request id, method and path; status and latency are
/// recorded on it once the inner chain returns.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: &dyn Handler) {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let _entered = span.enter();
        let start = Instant::now();

        next.call(req, res);

        let latency_ms = start.elapsed().as_millis() as u64;
        span.record("status", res.status);
        span.record("latency_ms", latency_ms);
        info!(status = res.status, latency_ms, "Request complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{compose, SharedMiddleware};
    use http::Method;
    use std::sync::Arc;

    #[test]
    fn test_tracing_middleware_is_transparent() {
        let chain: Vec<SharedMiddleware> = vec![Arc::new(TracingMiddleware)];
        let handler = |_req: &mut HandlerRequest, res: &mut HandlerResponse| res.text(201, "made");

        let mut req = HandlerRequest::new(Method::POST, "/things");
        let mut res = HandlerResponse::default();
        compose(&handler, &chain).call(&mut req, &mut res);

        assert_eq!(res.status, 201);
        assert_eq!(res.body_str(), Some("made"));
    }
}
