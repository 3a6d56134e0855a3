//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::MySqlPool;

use crate::config::{DatabaseConfig, EnvironmentConfig};

#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub config: EnvironmentConfig,
    pub db_config: DatabaseConfig,
}

impl AppState {
    pub fn new(pool: MySqlPool, config: EnvironmentConfig, db_config: DatabaseConfig) -> Self {
        Self {
            pool,
            config,
            db_config,
        }
    }

    /// Estado con un pool perezoso, sin tocar la base de datos
    pub fn from_config(config: EnvironmentConfig, db_config: DatabaseConfig) -> Self {
        let pool = db_config.create_lazy_pool();
        Self::new(pool, config, db_config)
    }
}
