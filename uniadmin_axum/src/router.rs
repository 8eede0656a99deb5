//! Router serving the whole application

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::LatencyUnit;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uniadmin::{App, MAX_FILE_SIZE};

use crate::config::UNIADMIN_BASE_PATH;

/// Room for one maximum-size image plus the other form fields.
const BODY_LIMIT: usize = MAX_FILE_SIZE * 2;

/// Create the application router
///
/// Every path under `UNIADMIN_BASE_PATH` goes through the core dispatcher, except
/// `{base}/assets/uploads/...`, which serves stored university images.
pub fn uniadmin_router(app: Arc<App>) -> Router {
    uniadmin_router_no_trace(app).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `uniadmin_router()` but without the HTTP tracing middleware.
pub fn uniadmin_router_no_trace(app: Arc<App>) -> Router {
    let uploads = ServeDir::new(app.images().dir());
    Router::new()
        .nest_service(
            &format!("{}/assets/uploads", UNIADMIN_BASE_PATH.as_str()),
            uploads,
        )
        .fallback(crate::handler::dispatch)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(app)
}
