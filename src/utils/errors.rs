//! Sistema de manejo de errores HTTP
//!
//! Este módulo define los errores que los handlers pueden devolver y su
//! conversión a respuestas JSON. Al cliente sólo llegan dos mensajes fijos;
//! el detalle queda en los logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::database::DbError;

pub const NOT_FOUND_MESSAGE: &str = "Página não encontrada";
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Cuerpo de error de la API
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl ErrorResponse {
    pub fn not_found() -> Self {
        Self {
            error: NOT_FOUND_MESSAGE,
        }
    }

    pub fn internal() -> Self {
        Self {
            error: INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::NotFound(path) => {
                warn!("🔍 Recurso no encontrado: {}", path);
                ErrorResponse::not_found()
            }
            AppError::Database(e) => {
                error!("❌ Error de base de datos ({:?}): {}", e.kind(), e);
                ErrorResponse::internal()
            }
            AppError::Internal(msg) => {
                error!("❌ Error interno: {}", msg);
                ErrorResponse::internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para handlers que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("/x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(DbError::Connection("refused".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::Internal("stack trace secreto".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Erro interno do servidor" }));
    }
}
