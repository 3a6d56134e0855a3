//! API endpoints
//!
//! Este módulo contiene los endpoints de la API y el montaje del router.

pub mod status;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{catch_panic_layer, cors_layer};
use crate::state::AppState;

/// Crear el router de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(status::index))
        .route("/api/health", get(status::health_check))
}

/// Crear la aplicación completa con middleware y manejadores de error
pub fn create_app(state: AppState) -> Router {
    build_app(create_api_router(), state)
}

/// Envolver un conjunto de rutas con el fallback 404, la captura de panics,
/// CORS y trazas
pub fn build_app(routes: Router<AppState>, state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    routes
        .fallback(status::not_found)
        .layer(catch_panic_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
