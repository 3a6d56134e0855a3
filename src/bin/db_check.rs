//! Diagnóstico manual de la base de datos: crea el esquema si hace falta y
//! abre una conexión de prueba.

use anyhow::Result;
use dotenvy::dotenv;
use tracing::{error, info};

use sisapa::config::DatabaseConfig;
use sisapa::database::{init_database, test_connection};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = DatabaseConfig::from_env()?;
    info!("🔍 Probando conexión con MySQL en {}...", config.masked_url());

    if let Err(e) = init_database(&config).await {
        error!("❌ Falla en la inicialización de la base de datos");
        return Err(e.into());
    }

    match test_connection(&config).await {
        Ok(_) => {
            info!("✅ Configuración de la base de datos OK!");
            Ok(())
        }
        Err(e) => {
            error!("❌ Falla en la prueba de conexión");
            Err(e.into())
        }
    }
}
