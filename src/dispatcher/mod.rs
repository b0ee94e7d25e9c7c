//! # Dispatcher Module
//!
//! Request-side types and the read-only [`Dispatcher`].
//!
//! A [`Router`](crate::router::Router) is frozen into a `Dispatcher` once all
//! routes are registered. For each request the dispatcher searches the route
//! tree, binds path parameters onto the [`HandlerRequest`], composes the
//! matched node's middleware around the handler and runs the chain into a
//! [`HandlerResponse`]. Routing failures go to the router's error handler.
//!
//! ## Request Flow
//!
//! 1. The server parses the wire request into a [`HandlerRequest`]
//! 2. [`Dispatcher::dispatch`] searches the tree
//! 3. The composed chain (or the error handler) fills the response
//! 4. The server writes the [`HandlerResponse`] back to the client
//!
//! Handlers run synchronously on the connection's coroutine.

mod core;
mod handler;
mod request;
mod response;

pub use core::{
    default_error_handler, Dispatcher, ErrorHandler, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY,
};
pub use handler::{Handler, SharedHandler};
pub use request::{HandlerRequest, HeaderVec, MAX_INLINE_HEADERS};
pub use response::HandlerResponse;
