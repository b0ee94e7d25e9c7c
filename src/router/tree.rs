//! Segment trie for HTTP route matching
//!
//! Each node of the tree stands for one path segment. A node owns:
//!
//! - a table from HTTP method to the registered [`Action`]
//! - any number of static children, keyed by their literal segment
//! - at most one parameter child, which matches any single segment
//! - the middleware bound at that node, in registration order
//!
//! The root stands for `/`. Routes are inserted during startup; afterwards
//! the tree is only read, so any number of threads may search it at once.
//!
//! ## Matching
//!
//! Search walks the request path one segment at a time. A static child with
//! the exact segment text always wins over the parameter child. The walk
//! commits to every choice it makes: if a static branch dead-ends further
//! down, the search reports not-found rather than retrying through the
//! parameter child.
//!
//! ```rust
//! use http::Method;
//! use std::sync::Arc;
//! use treerouter::dispatcher::{HandlerRequest, HandlerResponse, SharedHandler};
//! use treerouter::router::RouteTree;
//!
//! let get_user: SharedHandler = Arc::new(|_: &mut HandlerRequest, _: &mut HandlerResponse| {});
//! let mut tree = RouteTree::new();
//! tree.insert(&[Method::GET], "/users/:id", get_user, &[]);
//!
//! let found = tree.search(&Method::GET, "/users/42").unwrap();
//! assert_eq!(found.get_path_param("id"), Some("42"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::error::RouteError;
use super::segment::segments;
use crate::dispatcher::SharedHandler;
use crate::middleware::SharedMiddleware;

/// Prefix marking a segment as a parameter declaration (`:id`)
pub const PARAM_PREFIX: char = ':';

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter bag.
///
/// Names are `Arc<str>` cloned out of the tree (known at startup); values
/// are the literal segment text from the request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A handler bound to one method at one node
#[derive(Clone)]
pub struct Action {
    handler: SharedHandler,
    pattern: Arc<str>,
}

impl Action {
    /// The registered handler
    #[must_use]
    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    /// The path the handler was registered under
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Successful search result.
///
/// Borrows the action and the terminal node's middleware from the tree and
/// owns the parameters bound along the way. Built fresh for every search.
pub struct RouteMatch<'t> {
    action: &'t Action,
    middlewares: &'t [SharedMiddleware],
    /// Parameters bound by parameter segments, in path order
    pub path_params: ParamVec,
}

impl std::fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("action", self.action)
            .field("middleware_count", &self.middlewares.len())
            .field("path_params", &self.path_params)
            .finish()
    }
}

impl<'t> RouteMatch<'t> {
    /// The matched action
    #[must_use]
    pub fn action(&self) -> &'t Action {
        self.action
    }

    /// The matched handler
    #[must_use]
    pub fn handler(&self) -> &'t SharedHandler {
        &self.action.handler
    }

    /// Middleware bound at the matched node, in registration order
    #[must_use]
    pub fn middlewares(&self) -> &'t [SharedMiddleware] {
        self.middlewares
    }

    /// Get a path parameter by name.
    ///
    /// If the same name was declared at several depths, the deepest wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One level of the tree
#[derive(Clone, Default)]
pub(crate) struct Node {
    /// Literal segment, or the full `:name` declaration for parameter nodes
    label: String,
    /// Set if this node captures a segment
    param_name: Option<Arc<str>>,
    actions: HashMap<Method, Action>,
    children: HashMap<String, Node>,
    param_child: Option<Box<Node>>,
    middlewares: Vec<SharedMiddleware>,
}

impl Node {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Self::default()
        }
    }

    fn new_param(label: &str, name: &str) -> Self {
        Self {
            label: label.to_string(),
            param_name: Some(Arc::from(name)),
            ..Self::default()
        }
    }

    /// Find or create the child for `segment`
    fn child_or_insert(&mut self, segment: &str) -> &mut Node {
        if let Some(name) = segment.strip_prefix(PARAM_PREFIX) {
            let child = self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new_param(segment, name)));
            if child.param_name.as_deref() != Some(name) {
                // One parameter slot per level: keep the first declaration.
                warn!(
                    declared = %name,
                    existing = ?child.param_name,
                    "Parameter name conflicts with an existing parameter at the same depth"
                );
            }
            return child.as_mut();
        }
        self.children
            .entry(segment.to_string())
            .or_insert_with(|| Node::new(segment))
    }

    fn bind(
        &mut self,
        methods: &[Method],
        handler: &SharedHandler,
        pattern: &Arc<str>,
        middlewares: &[SharedMiddleware],
    ) {
        for method in methods {
            let previous = self.actions.insert(
                method.clone(),
                Action {
                    handler: Arc::clone(handler),
                    pattern: Arc::clone(pattern),
                },
            );
            if previous.is_some() {
                debug!(method = %method, pattern = %pattern, "Replacing previously registered handler");
            }
        }
        self.middlewares.extend(middlewares.iter().cloned());
    }

    /// Append middleware after the fact (used by route handles)
    pub(crate) fn push_middleware(&mut self, middleware: SharedMiddleware) {
        self.middlewares.push(middleware);
    }

    fn allowed_methods(&self) -> Vec<Method> {
        let mut allowed: Vec<Method> = self.actions.keys().cloned().collect();
        allowed.sort_by(|a, b| {
            method_order(a)
                .cmp(&method_order(b))
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        allowed
    }

    fn collect_routes(&self, out: &mut Vec<(Method, Arc<str>)>) {
        for method in self.allowed_methods() {
            if let Some(action) = self.actions.get(&method) {
                out.push((method, Arc::clone(&action.pattern)));
            }
        }
        let mut keys: Vec<&String> = self.children.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(child) = self.children.get(key) {
                child.collect_routes(out);
            }
        }
        if let Some(param) = &self.param_child {
            param.collect_routes(out);
        }
    }
}

fn method_order(method: &Method) -> u8 {
    match *method {
        Method::GET => 0,
        Method::HEAD => 1,
        Method::POST => 2,
        Method::PUT => 3,
        Method::DELETE => 4,
        Method::PATCH => 5,
        Method::OPTIONS => 6,
        Method::TRACE => 7,
        Method::CONNECT => 8,
        _ => 9,
    }
}

/// Route tree: a segment trie rooted at `/`
#[derive(Clone)]
pub struct RouteTree {
    root: Node,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// Create an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new("/"),
        }
    }

    /// Insert a route.
    ///
    /// Binds every method in `methods` to `handler` at the node for `path`,
    /// creating missing nodes on the way, and appends `middlewares` to that
    /// node. Re-binding a method replaces its handler; middleware always
    /// accumulates. Never fails.
    pub fn insert(
        &mut self,
        methods: &[Method],
        path: &str,
        handler: SharedHandler,
        middlewares: &[SharedMiddleware],
    ) {
        self.insert_node(methods, path, &handler, middlewares);
    }

    pub(crate) fn insert_node(
        &mut self,
        methods: &[Method],
        path: &str,
        handler: &SharedHandler,
        middlewares: &[SharedMiddleware],
    ) -> &mut Node {
        let pattern: Arc<str> = Arc::from(path);
        // "/" and anything else without segments stay on the root
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.child_or_insert(segment);
        }
        node.bind(methods, handler, &pattern, middlewares);
        node
    }

    /// Search for the action bound to `method` at `path`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::NotFound`] if the walk dead-ends before every segment
    ///   is consumed
    /// - [`RouteError::MethodNotAllowed`] if the walk reaches a node with no
    ///   action for `method`; `allowed` is empty for a node that only exists
    ///   as a prefix of longer routes
    pub fn search(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let mut params = ParamVec::new();
        let mut node = &self.root;
        for segment in segments(path) {
            node = match node.children.get(segment) {
                Some(child) => child,
                None => match node.param_child.as_deref() {
                    Some(child) => {
                        if let Some(name) = &child.param_name {
                            params.push((Arc::clone(name), segment.to_string()));
                        }
                        child
                    }
                    None => return Err(RouteError::NotFound),
                },
            };
        }

        match node.actions.get(method) {
            Some(action) => Ok(RouteMatch {
                action,
                middlewares: &node.middlewares,
                path_params: params,
            }),
            None => Err(RouteError::MethodNotAllowed {
                allowed: node.allowed_methods(),
            }),
        }
    }

    /// Every registered (method, pattern) pair, static branches first in
    /// lexical order
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, Arc<str>)> {
        let mut out = Vec::new();
        self.root.collect_routes(&mut out);
        out
    }

    /// Number of registered (method, node) bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes().len()
    }

    /// True if nothing has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first listing of every node path, for diagnostics.
    ///
    /// Parameter nodes appear with their `:name` label.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        fn walk(node: &Node, path: String, out: &mut Vec<String>) {
            let child_path = |label: &str| {
                if path == "/" {
                    format!("/{label}")
                } else {
                    format!("{path}/{label}")
                }
            };
            let mut keys: Vec<&String> = node.children.keys().collect();
            keys.sort();
            let mut next = Vec::with_capacity(keys.len() + 1);
            for key in keys {
                if let Some(child) = node.children.get(key) {
                    next.push((child, child_path(&child.label)));
                }
            }
            if let Some(param) = &node.param_child {
                next.push((param.as_ref(), child_path(&param.label)));
            }
            out.push(path);
            for (child, child_path) in next {
                walk(child, child_path, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, self.root.label.clone(), &mut out);
        out
    }
}
