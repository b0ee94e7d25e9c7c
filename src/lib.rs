//! # treerouter
//!
//! **treerouter** is a segment-trie HTTP request router for the `may`
//! coroutine runtime. Routes are registered at startup into a tree with one
//! node per path segment, middleware is bound to tree nodes, and a frozen
//! [`Dispatcher`](dispatcher::Dispatcher) serves requests from any number of
//! connections concurrently.
//!
//! ## Architecture
//!
//! - **[`router`]** - path segmentation, the route tree, registration
//!   ([`Router`](router::Router), groups, builders)
//! - **[`middleware`]** - the [`Middleware`](middleware::Middleware) trait,
//!   chain composition, tracing and metrics middleware
//! - **[`dispatcher`]** - handler and request/response types, the
//!   dispatcher and its error handler
//! - **[`server`]** - the `may_minihttp` transport
//! - **[`static_files`]** - files served through ordinary routes
//! - **[`config`]**, **[`logging`]**, **[`runtime_config`]** - service setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService
//!     participant Dispatcher
//!     participant Tree as RouteTree
//!     participant Chain as Middleware chain
//!     participant Handler
//!
//!     Client->>Server: HTTP request
//!     Server->>Dispatcher: HandlerRequest
//!     Dispatcher->>Tree: search(method, path)
//!     alt matched
//!         Tree-->>Dispatcher: handler, middleware, params
//!         Dispatcher->>Chain: M0(M1(..(H)))
//!         Chain->>Handler: call
//!         Handler-->>Chain: response
//!         Chain-->>Dispatcher: response
//!     else not found / method not allowed
//!         Tree-->>Dispatcher: RouteError
//!         Dispatcher->>Dispatcher: error handler
//!     end
//!     Dispatcher-->>Server: HandlerResponse
//!     Server-->>Client: HTTP response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use treerouter::middleware::TracingMiddleware;
//! use treerouter::router::Router;
//! use treerouter::server::{AppService, HttpServer};
//!
//! fn get_user(req: &mut HandlerRequest, res: &mut HandlerResponse) {
//!     let id = req.get_path_param("id").unwrap_or_default();
//!     res.json(200, &serde_json::json!({ "id": id }));
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut router = Router::new();
//! router.get("/users/:id", get_user).with(TracingMiddleware);
//!
//! let service = AppService::from(router.into_dispatcher());
//! let handle = HttpServer(service).start("0.0.0.0:8080")?;
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Matching rules
//!
//! - `/` and the empty path are the root
//! - empty segments are ignored, so `/a//b/` is `/a/b`
//! - `:name` matches any one segment and binds it as `name`
//! - at each level a literal child wins over the parameter child, and the
//!   search never goes back to try the parameter child instead
//! - a path that runs off the tree is not found (404); a path that reaches a
//!   node without a handler for the method is method-not-allowed (405), even
//!   when the node only exists as a prefix of longer routes

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use dispatcher::{Dispatcher, Handler, HandlerRequest, HandlerResponse};
pub use middleware::{Middleware, SharedMiddleware};
pub use router::{RouteError, Router, RouterGroup};
