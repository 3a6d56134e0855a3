//! Módulo de base de datos
//!
//! Maneja la conexión y operaciones con MySQL

pub mod connection;
pub mod error;
pub mod row;
pub mod setup;

pub use connection::{get_db_connection, DatabaseConnection, QueryOutcome};
pub use error::{DbError, DbErrorKind, DbResult};
pub use row::{is_select, Param, Record};
pub use setup::{init_database, test_connection};
