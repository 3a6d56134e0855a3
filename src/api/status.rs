//! Endpoints de estado de la API

use axum::{http::Uri, response::Json};
use serde_json::{json, Value};

use crate::utils::errors::AppError;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Página principal
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "SISAPA API funcionando!",
        "version": API_VERSION,
        "status": "ok"
    }))
}

/// Endpoint para verificar si la API está funcionando
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "SISAPA API está funcionando!",
        "version": API_VERSION
    }))
}

/// Respuesta para cualquier ruta no registrada
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
