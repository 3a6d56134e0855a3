//! Errores de la capa de base de datos
//!
//! Todo error del driver se clasifica en una categoría para que el llamador
//! pueda distinguir entre conectividad, consulta y restricciones.

use thiserror::Error;

/// Categoría de un [`DbError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    Connection,
    Query,
    Constraint,
    Configuration,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DbError {
    pub fn kind(&self) -> DbErrorKind {
        match self {
            DbError::Connection(_) => DbErrorKind::Connection,
            DbError::Query(_) => DbErrorKind::Query,
            DbError::Constraint(_) => DbErrorKind::Constraint,
            DbError::Configuration(_) => DbErrorKind::Configuration,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == DbErrorKind::Connection
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        let message = err.to_string();
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::Connection(message),
            sqlx::Error::Configuration(_) => DbError::Configuration(message),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DbError::Constraint(message),
                _ if is_access_denied(db_err.code().as_deref()) => DbError::Connection(message),
                _ => DbError::Query(message),
            },
            _ => DbError::Query(message),
        }
    }
}

impl From<crate::config::ConfigError> for DbError {
    fn from(err: crate::config::ConfigError) -> Self {
        DbError::Configuration(err.to_string())
    }
}

/// SQLSTATE de credenciales rechazadas
fn is_access_denied(code: Option<&str>) -> bool {
    matches!(code, Some("28000"))
}

/// Resultado tipado para operaciones de base de datos
pub type DbResult<T> = Result<T, DbError>;
