use std::sync::Arc;

use super::{HandlerRequest, HandlerResponse};

/// A terminal request handler.
///
/// Any `Fn(&mut HandlerRequest, &mut HandlerResponse)` closure or function
/// that is `Send + Sync` is a handler:
///
/// ```
/// use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
///
/// fn get_user(req: &mut HandlerRequest, res: &mut HandlerResponse) {
///     let id = req.get_path_param("id").unwrap_or_default();
///     res.json(200, &serde_json::json!({ "id": id }));
/// }
/// ```
///
/// Handlers run on `may` coroutines and may block on I/O; the dispatcher
/// does not interrupt them.
pub trait Handler: Send + Sync {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse);
}

impl<F> Handler for F
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse) + Send + Sync,
{
    #[inline]
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        self(req, res)
    }
}

/// Handler as stored in the route tree
pub type SharedHandler = Arc<dyn Handler>;
