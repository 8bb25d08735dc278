//! Response dispatch.
//!
//! Combines a completed request with the router's decision and produces the
//! response to queue on the connection. Actual content generation (reading
//! files, running scripts) lives behind [`ContentHandler`]; the dispatcher
//! never inspects what a handler returns.

use crate::config::Config;
use crate::http::request::{Request, Validity};
use crate::http::response::Response;
use crate::router::{self, RouteOutcome};

/// Everything a content handler receives for a matched route.
pub struct HandlerContext<'a> {
    /// Effective document root for this request.
    pub root: &'a str,
    /// Effective index file list, in priority order.
    pub index_files: &'a [String],
    /// Path prefix of the matched location, if a location matched.
    pub matched_location: Option<&'a str>,
    pub request: &'a Request,
}

/// Downstream content handler: turns a matched route into a response.
pub trait ContentHandler: Send + Sync {
    fn handle(&self, ctx: HandlerContext<'_>) -> Response;
}

/// Stands in for a real file-serving handler.
pub struct PlaceholderHandler;

impl ContentHandler for PlaceholderHandler {
    fn handle(&self, ctx: HandlerContext<'_>) -> Response {
        Response::ok(format!("serving {} from {}\n", ctx.request.path, ctx.root))
    }
}

/// Produces the response for a request. Every branch, including the error
/// ones, yields a well-formed response; a bad request is answered, never
/// dropped.
pub fn dispatch(config: &Config, request: &Request, handler: &dyn ContentHandler) -> Response {
    if request.validity == Validity::Invalid {
        return Response::bad_request();
    }

    let decision = router::resolve(config, request);
    match decision.outcome {
        RouteOutcome::Redirect { status, target } => Response::redirect(status, &target),
        RouteOutcome::MethodNotAllowed => Response::method_not_allowed(&decision.methods),
        RouteOutcome::NotFound => Response::not_found(),
        RouteOutcome::Matched => {
            let ctx = HandlerContext {
                // Matched guarantees an effective root exists.
                root: decision.root.as_deref().unwrap_or(""),
                index_files: &decision.index_files,
                matched_location: decision.matched_location.as_deref(),
                request,
            };
            handler.handle(ctx)
        }
    }
}
