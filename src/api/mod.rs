//! Web front end using Axum
//!
//! - `GET /` landing page
//! - `GET /predictdata` prediction form with calibrated channel labels
//! - `POST /predictdata` range check + classification, rendered inline
//! - `GET /health` artifact presence report (JSON)

pub mod handlers;
pub mod render;

pub use handlers::WebState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted form body.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Restrictive by default (same-origin only).
///
/// Set `SENSOR_GUARD_CORS_ORIGINS` to a comma-separated list of allowed
/// origins to open it up.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("SENSOR_GUARD_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new().allow_methods([Method::GET, Method::POST]),
    }
}

/// Create the application router.
pub fn create_app(state: WebState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/predictdata",
            get(handlers::predict_form).post(handlers::predict_submit),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors_layer()),
        )
}
