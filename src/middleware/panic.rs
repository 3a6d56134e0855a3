//! Conversión de panics en respuestas 500

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::utils::errors::ErrorResponse;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Capa que captura cualquier panic de un handler
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "panic sin mensaje"
    };
    error!("💥 Panic en handler: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal())).into_response()
}
