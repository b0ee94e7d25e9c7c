//! # Router Module
//!
//! Route registration and path matching.
//!
//! Routes are stored in a [`RouteTree`], a trie with one node per path
//! segment. Segments starting with `:` declare a parameter that matches any
//! single segment; everything else matches literally. At each level a
//! literal child beats the parameter child.
//!
//! [`Router`] is the registration surface: per-method helpers, a
//! [`RouteBuilder`] for multi-method routes, and [`RouterGroup`] for shared
//! prefixes and middleware. Once everything is registered the router is
//! frozen into a [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use treerouter::router::{RouteError, Router};
//!
//! fn get_pet(req: &mut HandlerRequest, res: &mut HandlerResponse) {
//!     let id = req.get_path_param("id").unwrap_or_default();
//!     res.json(200, &serde_json::json!({ "id": id }));
//! }
//!
//! let mut router = Router::new();
//! router.get("/pets/:id", get_pet);
//!
//! let found = router.tree().search(&Method::GET, "/pets/7").unwrap();
//! assert_eq!(found.get_path_param("id"), Some("7"));
//!
//! let missed = router.tree().search(&Method::POST, "/pets/7").unwrap_err();
//! assert_eq!(missed.status(), 405);
//! assert!(matches!(
//!     router.tree().search(&Method::GET, "/owners"),
//!     Err(RouteError::NotFound)
//! ));
//! ```

mod core;
mod error;
mod group;
mod segment;
mod tree;

pub use core::{RouteBuilder, RouteHandle, Router};
pub use error::RouteError;
pub use group::RouterGroup;
pub use segment::{segments, SegmentVec, MAX_INLINE_SEGMENTS};
pub use tree::{Action, ParamVec, RouteMatch, RouteTree, MAX_INLINE_PARAMS, PARAM_PREFIX};
