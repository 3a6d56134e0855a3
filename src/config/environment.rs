//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración
//! del servidor HTTP. Los valores se leen una sola vez al arrancar el proceso.

use std::env;
use thiserror::Error;

/// Clave de sesión usada cuando `SECRET_KEY` no está definida
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

/// Puerto por defecto del servidor
pub const DEFAULT_PORT: u16 = 5000;

/// Errores al leer la configuración del entorno
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub secret_key: String,
    /// `None` = CORS permisivo
    pub cors_origins: Option<Vec<String>>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            cors_origins: None,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construir la configuración a partir de una función de búsqueda.
    ///
    /// `ENVIRONMENT` tiene prioridad sobre `FLASK_ENV`; ambos se aceptan
    /// para mantener compatibilidad con los despliegues existentes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("FLASK_ENV"))
            .unwrap_or(defaults.environment);

        let port = match lookup("PORT") {
            Some(value) => parse_number("PORT", &value)?,
            None => defaults.port,
        };

        let cors_origins = lookup("CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            environment,
            port,
            host: defaults.host,
            secret_key: lookup("SECRET_KEY").unwrap_or(defaults.secret_key),
            cors_origins,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parsear un valor numérico de una variable de entorno
pub(crate) fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = EnvironmentConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.secret_key, DEFAULT_SECRET_KEY);
        assert!(config.is_production());
        assert!(!config.is_development());
        assert!(config.cors_origins.is_none());
        assert_eq!(config.server_url(), "0.0.0.0:5000");
    }

    #[test]
    fn test_flask_env_enables_development() {
        let config =
            EnvironmentConfig::from_lookup(lookup_from(&[("FLASK_ENV", "development")])).unwrap();
        assert!(config.is_development());
    }

    #[test]
    fn test_environment_takes_precedence() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            ("FLASK_ENV", "development"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "PORT",
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[(
            "CORS_ORIGINS",
            "http://localhost:3000, https://sisapa.gov.br ,",
        )]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "http://localhost:3000".to_string(),
                "https://sisapa.gov.br".to_string()
            ])
        );
    }
}
