//! Configuración de base de datos
//!
//! Este módulo maneja la configuración de MySQL con SQLx: parámetros de
//! conexión, opciones de sesión y creación del pool usado por el servidor.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::env;
use std::time::Duration;

use super::environment::{parse_number, ConfigError};

pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";
/// Horário de Brasília
pub const DEFAULT_TIMEZONE: &str = "-03:00";

/// Configuración de la base de datos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub charset: String,
    pub collation: String,
    pub autocommit: bool,
    pub timezone: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "sisapa_db".to_string(),
            charset: DEFAULT_CHARSET.to_string(),
            collation: DEFAULT_COLLATION.to_string(),
            autocommit: true,
            timezone: DEFAULT_TIMEZONE.to_string(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// Leer la configuración desde `DB_HOST`, `DB_PORT`, `DB_USER`,
    /// `DB_PASSWORD` y `DB_NAME`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("DB_PORT") {
            Some(value) => parse_number("DB_PORT", &value)?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            database: lookup("DB_NAME").unwrap_or(defaults.database),
            ..defaults
        })
    }

    /// Opciones de conexión sin seleccionar esquema
    pub fn server_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .charset(&self.charset)
            .collation(&self.collation)
            .timezone(Some(self.timezone.clone()))
    }

    /// Opciones de conexión con el esquema de la aplicación seleccionado
    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.server_options().database(&self.database)
    }

    /// URL de conexión (incluye la contraseña, no usar en logs)
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// URL con credenciales enmascaradas, apta para logs
    pub fn masked_url(&self) -> String {
        mask_database_url(&self.url())
    }

    /// Crear el pool de conexiones sin abrir ninguna conexión todavía.
    ///
    /// Las conexiones se establecen en el primer uso, así que el servidor
    /// arranca aunque MySQL no esté disponible.
    pub fn create_lazy_pool(&self) -> MySqlPool {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy_with(self.connect_options())
    }
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            let protocol = &url[..scheme_end + 3];
            let host = &url[at_pos + 1..];
            format!("{}***:***@{}", protocol, host)
        }
        _ => url.to_string(),
    }
}
