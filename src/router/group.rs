use std::sync::Arc;

use http::Method;

use super::core::{RouteHandle, Router};
use crate::dispatcher::{Handler, SharedHandler};
use crate::middleware::{Middleware, SharedMiddleware};

/// Registrar that prefixes every route with a fixed path and a fixed list of
/// middleware.
///
/// Group middleware runs outside any middleware given for the individual
/// route.
///
/// ```rust
/// use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
/// use treerouter::middleware::TracingMiddleware;
/// use treerouter::router::Router;
///
/// fn list_users(_req: &mut HandlerRequest, res: &mut HandlerResponse) {
///     res.json(200, &serde_json::json!([]));
/// }
///
/// let mut router = Router::new();
/// let mut api = router.group("/api").with(TracingMiddleware);
/// api.get("/users", list_users);
/// assert_eq!(&*router.tree().routes()[0].1, "/api/users");
/// ```
pub struct RouterGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middlewares: Vec<SharedMiddleware>,
}

/// Join a group prefix and a route path with exactly one slash
fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        format!("/{path}")
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}

impl<'r> RouterGroup<'r> {
    pub(crate) fn new(
        router: &'r mut Router,
        prefix: String,
        middlewares: Vec<SharedMiddleware>,
    ) -> Self {
        Self {
            router,
            prefix,
            middlewares,
        }
    }

    /// Add middleware applied to every route registered afterwards
    #[must_use]
    pub fn with<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.with_shared(Arc::new(middleware))
    }

    /// Add shared middleware applied to every route registered afterwards
    #[must_use]
    pub fn with_shared(mut self, middleware: SharedMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// The group's path prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Open a nested group; it inherits this group's prefix and middleware
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        RouterGroup {
            router: &mut *self.router,
            prefix: join_path(&self.prefix, prefix),
            middlewares: self.middlewares.clone(),
        }
    }

    /// Register `handler` for `methods` at `prefix + path`
    pub fn insert<H: Handler + 'static>(
        &mut self,
        methods: &[Method],
        path: &str,
        handler: H,
    ) -> RouteHandle<'_> {
        self.insert_shared(methods, path, Arc::new(handler))
    }

    fn insert_shared(&mut self, methods: &[Method], path: &str, handler: SharedHandler) -> RouteHandle<'_> {
        let full_path = join_path(&self.prefix, path);
        self.router
            .insert_shared(methods, &full_path, handler, &self.middlewares)
    }

    /// Register a `GET` handler
    pub fn get<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::GET], path, handler)
    }

    /// Register a `POST` handler
    pub fn post<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::POST], path, handler)
    }

    /// Register a `PUT` handler
    pub fn put<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::PUT], path, handler)
    }

    /// Register a `DELETE` handler
    pub fn delete<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::DELETE], path, handler)
    }

    /// Register a `PATCH` handler
    pub fn patch<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::PATCH], path, handler)
    }

    /// Register a `HEAD` handler
    pub fn head<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::HEAD], path, handler)
    }

    /// Register an `OPTIONS` handler
    pub fn options<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteHandle<'_> {
        self.insert(&[Method::OPTIONS], path, handler)
    }
}
