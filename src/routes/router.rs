/**
 * Router Configuration
 *
 * Combines the route tables into the final application router. Protected
 * routes sit behind the authentication middleware; the whole router gets a
 * permissive CORS layer because the browser frontend is served separately.
 */

use axum::{http::StatusCode, middleware, Router};
use tower_http::cors::CorsLayer;

use crate::middleware::auth::auth_middleware;
use crate::routes::api_routes::{protected_routes, public_routes};
use crate::server::state::AppState;

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router {
    let protected = protected_routes().route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        auth_middleware,
    ));

    public_routes()
        .merge(protected)
        .layer(CorsLayer::permissive())
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .with_state(app_state)
}
