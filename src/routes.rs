use axum::{middleware::from_fn, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::get_handler;
use crate::middleware::allow_any_origin;
use crate::state::AppState;

// Route path constants - single source of truth for the HTTP surface

/// The bare root path; its derived key is the empty string
pub const ROOT: &str = "/";
/// Everything under the root; the wildcard spans path separators
pub const OBJECT: &str = "/{*key}";

/// Build the application router
///
/// Both patterns funnel into the one GET handler, so together they cover
/// every request path. The CORS stage wraps the routes (method rejections
/// included), and request tracing sits outermost.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(ROOT, get(get_handler))
        .route(OBJECT, get(get_handler))
        .layer(from_fn(allow_any_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
