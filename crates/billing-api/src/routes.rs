//! # Routes
//!
//! Axum router configuration for the billing API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /config - Publishable key and price IDs
/// - POST /create-checkout-session - Redirect to hosted checkout
/// - GET  /checkout-session - Checkout session lookup
/// - POST /customer-portal - Redirect to the billing portal
/// - POST /webhook - Stripe webhook handler
///
/// - Static pages:
///   - GET /html/success.html - Checkout success page
///   - GET /* - Files from the static directory
///
/// A wrong method on any API route answers 405.
pub fn create_router(state: AppState) -> Router {
    // The sample frontend may be served from a different origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let success_page = ServeFile::new(state.config.success_page());
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/config", get(handlers::config))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/checkout-session", get(handlers::checkout_session))
        .route("/customer-portal", post(handlers::customer_portal))
        .route("/webhook", post(handlers::webhook))
        .route_service("/html/success.html", success_page)
        .fallback_service(static_files)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
