//! Middleware: decorators composed around route handlers.
//!
//! Middleware is bound to route tree nodes at registration time and composed
//! per request by the dispatcher, first registered outermost.

mod core;
mod metrics;
mod tracing;

pub use core::{compose, from_fn, FnMiddleware, Middleware, Next, SharedMiddleware};
pub use metrics::{metrics_handler, MetricsMiddleware, PROMETHEUS_CONTENT_TYPE};
pub use tracing::TracingMiddleware;
