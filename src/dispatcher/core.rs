use std::sync::Arc;
use std::time::Instant;

use http::Method;
use tracing::{debug, info, warn};

use super::{Handler, HandlerRequest, HandlerResponse};
use crate::middleware::compose;
use crate::router::{RouteError, RouteMatch, RouteTree, Router};

/// Body written by the default handler for [`RouteError::NotFound`]
pub const NOT_FOUND_BODY: &str = "page not found";

/// Body written by the default handler for [`RouteError::MethodNotAllowed`]
pub const METHOD_NOT_ALLOWED_BODY: &str = "method not allowed";

/// Callback that renders a routing failure into the response
pub type ErrorHandler = Arc<dyn Fn(&mut HandlerResponse, &HandlerRequest, &RouteError) + Send + Sync>;

/// Writes `404 page not found` or `405 method not allowed` as plain text.
///
/// For 405 the `Allow` header lists the methods bound at the matched path.
pub fn default_error_handler(res: &mut HandlerResponse, _req: &HandlerRequest, err: &RouteError) {
    match err {
        RouteError::NotFound => res.text(err.status(), NOT_FOUND_BODY),
        RouteError::MethodNotAllowed { .. } => {
            res.text(err.status(), METHOD_NOT_ALLOWED_BODY);
            if let Some(allow) = err.allow_header() {
                res.set_header("allow", allow);
            }
        }
    }
}

/// Read-only request dispatcher.
///
/// Built once from a [`Router`]; afterwards it is shared by every connection
/// (usually behind an `Arc`) and never mutated.
pub struct Dispatcher {
    tree: RouteTree,
    error_handler: ErrorHandler,
}

impl From<Router> for Dispatcher {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

impl Dispatcher {
    /// Freeze `router` into a dispatcher
    #[must_use]
    pub fn new(router: Router) -> Self {
        let (tree, error_handler) = router.into_parts();
        info!(route_count = tree.len(), "Dispatcher ready");
        Self {
            tree,
            error_handler,
        }
    }

    /// The frozen route tree
    #[must_use]
    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    /// Look up `method` and `path` without running anything
    pub fn route(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let start = Instant::now();
        let result = self.tree.search(method, path);
        let lookup_us = start.elapsed().as_micros() as u64;
        match &result {
            Ok(found) => debug!(
                method = %method,
                path = %path,
                pattern = %found.action().pattern(),
                params = ?found.path_params,
                lookup_us,
                "Route matched"
            ),
            Err(RouteError::NotFound) => info!(
                method = %method,
                path = %path,
                lookup_us,
                "No route matched"
            ),
            Err(err @ RouteError::MethodNotAllowed { .. }) => warn!(
                method = %method,
                path = %path,
                allow = ?err.allow_header(),
                "Method not allowed"
            ),
        }
        result
    }

    /// Route `req` and run the matched chain into `res`.
    ///
    /// On a match, `req.path_params` is replaced with the bound parameters,
    /// the node's middleware is composed around the handler (first
    /// registered outermost) and the chain runs once. On a miss, only the
    /// error handler runs; no middleware is invoked.
    pub fn dispatch(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        match self.route(&req.method, &req.path) {
            Ok(found) => {
                let handler = found.handler();
                let middlewares = found.middlewares();
                req.path_params = found.path_params;
                let chain = compose(handler.as_ref(), middlewares);
                chain.call(req, res);
                debug!(
                    request_id = %req.request_id,
                    status = res.status,
                    "Handler chain complete"
                );
            }
            Err(err) => (self.error_handler)(res, req, &err),
        }
    }

    /// Dispatch an owned request and return the response
    #[must_use]
    pub fn serve(&self, mut req: HandlerRequest) -> HandlerResponse {
        let mut res = HandlerResponse::default();
        self.dispatch(&mut req, &mut res);
        res
    }
}
