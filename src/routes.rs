// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::results,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Every `/api/results` route requires a bearer token.
/// * Per-user listings for other users need a staff role; amendments need admin.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let staff_routes = Router::new()
        .route("/users/{user_id}", get(results::list_user_results))
        .route("/users/{user_id}/summary", get(results::user_summary))
        .layer(middleware::from_fn(staff_middleware));

    let result_routes = Router::new()
        .route("/", post(results::record_result))
        .route("/me", get(results::list_my_results))
        .route("/me/summary", get(results::my_summary))
        .route("/leaderboard", get(results::get_leaderboard))
        .route(
            "/{id}",
            get(results::get_result).merge(
                patch(results::amend_result).route_layer(middleware::from_fn(admin_middleware)),
            ),
        )
        .merge(staff_routes)
        // Runs before the role checks above.
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/results", result_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
