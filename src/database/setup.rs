//! Inicialización y diagnóstico de la base de datos
//!
//! Ambas funciones abren su propia conexión temporal, independiente de la
//! conexión compartida.

use lazy_static::lazy_static;
use regex::Regex;
use sqlx::mysql::MySqlConnection;
use sqlx::{Connection, Executor};
use tracing::{error, info};

use super::error::{DbError, DbResult};
use crate::config::DatabaseConfig;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z0-9_$]{1,64}$").unwrap();
}

/// Validar y entrecomillar un identificador de MySQL
fn quote_identifier(name: &str) -> DbResult<String> {
    if IDENTIFIER.is_match(name) {
        Ok(format!("`{}`", name))
    } else {
        Err(DbError::Configuration(format!(
            "identificador de MySQL inválido: '{}'",
            name
        )))
    }
}

fn schema_statements(config: &DatabaseConfig) -> DbResult<[String; 2]> {
    let schema = quote_identifier(&config.database)?;
    // charset y collation no se entrecomillan, pero deben ser identificadores válidos
    quote_identifier(&config.charset)?;
    quote_identifier(&config.collation)?;

    Ok([
        format!(
            "CREATE DATABASE IF NOT EXISTS {} CHARACTER SET {} COLLATE {}",
            schema, config.charset, config.collation
        ),
        format!("USE {}", schema),
    ])
}

/// Crear el esquema de la aplicación si no existe.
///
/// Se conecta sin seleccionar esquema, así que funciona en un servidor vacío.
/// Llamarla varias veces no modifica un esquema existente.
pub async fn init_database(config: &DatabaseConfig) -> DbResult<()> {
    match create_schema(config).await {
        Ok(()) => {
            info!("✅ Database '{}' verificada/creada con éxito", config.database);
            Ok(())
        }
        Err(e) => {
            error!("❌ Error al inicializar database: {}", e);
            Err(e)
        }
    }
}

async fn create_schema(config: &DatabaseConfig) -> DbResult<()> {
    let statements = schema_statements(config)?;
    let mut conn = MySqlConnection::connect_with(&config.server_options()).await?;

    for sql in &statements {
        if let Err(e) = conn.execute(sql.as_str()).await {
            let _ = conn.close().await;
            return Err(e.into());
        }
    }

    conn.close().await?;
    Ok(())
}

/// Probar la conexión con una conexión independiente y devolver la
/// versión del servidor
pub async fn test_connection(config: &DatabaseConfig) -> DbResult<String> {
    match query_version(config).await {
        Ok(version) => {
            info!("✅ Conexión de prueba exitosa. MySQL versión: {}", version);
            Ok(version)
        }
        Err(e) => {
            error!("❌ Error en la prueba de conexión: {}", e);
            Err(e)
        }
    }
}

async fn query_version(config: &DatabaseConfig) -> DbResult<String> {
    let mut conn = MySqlConnection::connect_with(&config.connect_options()).await?;
    let version = sqlx::query_scalar::<_, String>("SELECT VERSION()")
        .fetch_one(&mut conn)
        .await;
    let _ = conn.close().await;
    Ok(version?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbErrorKind;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("sisapa_db").unwrap(), "`sisapa_db`");
        assert!(quote_identifier("sisapa-db").is_err());
        assert!(quote_identifier("x`; DROP DATABASE y; --").is_err());
        assert!(quote_identifier("").is_err());
        assert!(quote_identifier(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_schema_statements() {
        let statements = schema_statements(&DatabaseConfig::default()).unwrap();
        assert_eq!(
            statements[0],
            "CREATE DATABASE IF NOT EXISTS `sisapa_db` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
        assert_eq!(statements[1], "USE `sisapa_db`");
    }

    #[tokio::test]
    async fn test_init_database_rejects_bad_name_before_connecting() {
        let config = DatabaseConfig {
            database: "nome inválido".to_string(),
            ..DatabaseConfig::default()
        };
        let err = init_database(&config).await.unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DatabaseConfig::default()
        };
        assert!(init_database(&config).await.unwrap_err().is_connection());
        assert!(test_connection(&config).await.unwrap_err().is_connection());
    }
}
