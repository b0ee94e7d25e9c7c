//! Route registration.
//!
//! [`Router`] is the mutable, startup-time side of routing: it owns the
//! [`RouteTree`] and the error handler while routes are registered, and is
//! then consumed into a [`Dispatcher`] that only reads.

use std::sync::Arc;

use http::Method;
use tracing::{info, warn};

use super::error::RouteError;
use super::group::RouterGroup;
use super::tree::{Node, RouteTree};
use crate::dispatcher::{
    default_error_handler, Dispatcher, ErrorHandler, Handler, HandlerRequest, HandlerResponse,
    SharedHandler,
};
use crate::middleware::{Middleware, SharedMiddleware};

/// Route registry used during startup.
///
/// ```rust
/// use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
/// use treerouter::router::Router;
///
/// fn list_pets(_req: &mut HandlerRequest, res: &mut HandlerResponse) {
///     res.json(200, &serde_json::json!([]));
/// }
///
/// let mut router = Router::new();
/// router.get("/pets", list_pets);
/// let dispatcher = router.into_dispatcher();
/// let res = dispatcher.serve(HandlerRequest::new(http::Method::GET, "/pets"));
/// assert_eq!(res.status, 200);
/// ```
pub struct Router {
    tree: RouteTree,
    error_handler: ErrorHandler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router with the default error handler
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RouteTree::new(),
            error_handler: Arc::new(default_error_handler),
        }
    }

    /// Replace the handler invoked for not-found and method-not-allowed.
    ///
    /// The handler belongs to this router only; the last call wins.
    pub fn set_error_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut HandlerResponse, &HandlerRequest, &RouteError) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Register `handler` for every method in `methods` at `path`, appending
    /// `middlewares` to the node.
    pub fn insert<H>(
        &mut self,
        methods: &[Method],
        path: &str,
        handler: H,
        middlewares: &[SharedMiddleware],
    ) -> RouteHandle<'_>
    where
        H: Handler + 'static,
    {
        self.insert_shared(methods, path, Arc::new(handler), middlewares)
    }

    /// Same as [`Router::insert`] for an already shared handler
    pub fn insert_shared(
        &mut self,
        methods: &[Method],
        path: &str,
        handler: SharedHandler,
        middlewares: &[SharedMiddleware],
    ) -> RouteHandle<'_> {
        if methods.is_empty() {
            warn!(path = %path, "Route registered without any method");
        }
        info!(
            methods = ?methods,
            path = %path,
            middleware_count = middlewares.len(),
            "Route registered"
        );
        let node = self.tree.insert_node(methods, path, &handler, middlewares);
        RouteHandle { node }
    }

    fn method_route(&mut self, method: Method, path: &str, handler: SharedHandler) -> RouteHandle<'_> {
        self.insert_shared(&[method], path, handler, &[])
    }

    /// Register a `GET` handler
    pub fn get<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::GET, path, Arc::new(handler))
    }

    /// Register a `POST` handler
    pub fn post<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::POST, path, Arc::new(handler))
    }

    /// Register a `PUT` handler
    pub fn put<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::PUT, path, Arc::new(handler))
    }

    /// Register a `DELETE` handler
    pub fn delete<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::DELETE, path, Arc::new(handler))
    }

    /// Register a `PATCH` handler
    pub fn patch<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::PATCH, path, Arc::new(handler))
    }

    /// Register a `HEAD` handler
    pub fn head<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::HEAD, path, Arc::new(handler))
    }

    /// Register an `OPTIONS` handler
    pub fn options<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.method_route(Method::OPTIONS, path, Arc::new(handler))
    }

    /// Start a multi-method registration at `path`.
    ///
    /// The builder is a local value; nothing touches the tree until
    /// [`RouteBuilder::handler`] consumes it.
    pub fn route(&mut self, path: &str) -> RouteBuilder<'_> {
        RouteBuilder {
            router: self,
            path: path.to_string(),
            methods: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    /// Open a group whose registrations are prefixed with `prefix`
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        RouterGroup::new(self, prefix.to_string(), Vec::new())
    }

    /// The route tree built so far
    #[must_use]
    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        let routes = self.tree.routes();
        println!("[routes] count={}", routes.len());
        for (method, pattern) in routes {
            println!("[route] {method} {pattern}");
        }
    }

    /// Freeze the routes into a read-only dispatcher
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(self)
    }

    pub(crate) fn into_parts(self) -> (RouteTree, ErrorHandler) {
        (self.tree, self.error_handler)
    }
}

/// Handle to the node a registration just touched.
///
/// Middleware added through the handle is appended to the node after any
/// middleware passed at registration time, in call order.
pub struct RouteHandle<'r> {
    node: &'r mut Node,
}

impl RouteHandle<'_> {
    /// Append middleware to the route's node
    pub fn with<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.with_shared(Arc::new(middleware))
    }

    /// Append an already shared middleware to the route's node
    pub fn with_shared(self, middleware: SharedMiddleware) -> Self {
        self.node.push_middleware(middleware);
        self
    }
}

/// Local builder for one registration
pub struct RouteBuilder<'r> {
    router: &'r mut Router,
    path: String,
    methods: Vec<Method>,
    middlewares: Vec<SharedMiddleware>,
}

impl<'r> RouteBuilder<'r> {
    /// Add one method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add several methods
    #[must_use]
    pub fn methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Add middleware
    #[must_use]
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Bind `handler` and insert the route
    pub fn handler<H: Handler + 'static>(self, handler: H) -> RouteHandle<'r> {
        let RouteBuilder {
            router,
            path,
            methods,
            middlewares,
        } = self;
        router.insert_shared(&methods, &path, Arc::new(handler), &middlewares)
    }
}
