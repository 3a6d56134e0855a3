//! Conexión única a MySQL
//!
//! `DatabaseConnection` mantiene una sola conexión viva detrás de un mutex
//! asíncrono. Todas las operaciones devuelven `DbResult`, nunca hacen panic y
//! registran el error antes de devolverlo.

use lazy_static::lazy_static;
use sqlx::mysql::{MySqlConnection, MySqlQueryResult, MySqlRow};
use sqlx::{Connection, Executor, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::error::{DbError, DbResult};
use super::row::{bind_params, is_select, row_to_record, Param, Record};
use crate::config::{ConfigError, DatabaseConfig};

/// Resultado de [`DatabaseConnection::execute`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Filas de un `SELECT` ejecutado con `fetch`
    Rows(Vec<Record>),
    /// Filas afectadas por una escritura ejecutada con `fetch`
    Affected(u64),
    /// Escritura confirmada sin `fetch`
    Done,
}

impl QueryOutcome {
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            QueryOutcome::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

/// Gestor de la conexión con la base de datos MySQL
pub struct DatabaseConnection {
    config: DatabaseConfig,
    connection: Mutex<Option<MySqlConnection>>,
}

impl DatabaseConnection {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
        }
    }

    /// Crear el gestor leyendo la configuración del entorno
    pub fn new_default() -> Result<Self, ConfigError> {
        DatabaseConfig::from_env().map(Self::new)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Establecer conexión con la base de datos.
    ///
    /// Cualquier conexión anterior se cierra primero. Si la apertura falla,
    /// el gestor queda sin conexión.
    pub async fn connect(&self) -> DbResult<()> {
        let mut slot = self.connection.lock().await;
        self.connect_locked(&mut slot).await
    }

    /// Cerrar la conexión. Los errores del driver se registran y se ignoran.
    pub async fn disconnect(&self) {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.take() {
            match conn.close().await {
                Ok(()) => info!("🔌 Conexión MySQL cerrada"),
                Err(e) => error!("❌ Error al desconectar: {}", e),
            }
        }
    }

    /// Indica si hay una conexión abierta, sin consultar al servidor
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Ejecutar una sentencia.
    ///
    /// Con `fetch`, un `SELECT` devuelve sus filas y cualquier otra sentencia
    /// devuelve el número de filas afectadas. Sin `fetch` la sentencia se
    /// confirma y se devuelve `Done`. Las escrituras corren dentro de una
    /// transacción que se deshace si hay error.
    pub async fn execute(
        &self,
        query: &str,
        params: &[Param],
        fetch: bool,
    ) -> DbResult<QueryOutcome> {
        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;

        let result = run_statement(conn, query, params, fetch).await;
        if let Err(e) = &result {
            error!("❌ Error al ejecutar query: {}", e);
        }
        result
    }

    /// Ejecutar la misma sentencia una vez por cada fila de parámetros,
    /// confirmando todo en una única transacción
    pub async fn execute_many(&self, query: &str, rows: &[Vec<Param>]) -> DbResult<u64> {
        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;

        if rows.is_empty() {
            debug!("Lote vacío, nada que ejecutar");
            return Ok(0);
        }

        let result = run_batch(conn, query, rows).await;
        if let Err(e) = &result {
            error!("❌ Error al ejecutar múltiples queries: {}", e);
        }
        result
    }

    /// Verificar si la conexión está activa (`ping` + `SELECT 1`)
    pub async fn check_connection(&self) -> bool {
        let mut slot = self.connection.lock().await;
        match slot.as_mut() {
            Some(conn) => conn.ping().await.is_ok() && conn.execute("SELECT 1").await.is_ok(),
            None => false,
        }
    }

    async fn connect_locked(&self, slot: &mut Option<MySqlConnection>) -> DbResult<()> {
        if let Some(previous) = slot.take() {
            if let Err(e) = previous.close().await {
                warn!("⚠️ Error cerrando la conexión anterior: {}", e);
            }
        }

        match self.open().await {
            Ok(conn) => {
                *slot = Some(conn);
                Ok(())
            }
            Err(e) => {
                error!("❌ Error al conectar con MySQL: {}", e);
                Err(e)
            }
        }
    }

    async fn open(&self) -> DbResult<MySqlConnection> {
        let mut conn = MySqlConnection::connect_with(&self.config.connect_options()).await?;

        let autocommit = if self.config.autocommit {
            "SET autocommit = 1"
        } else {
            "SET autocommit = 0"
        };
        conn.execute(autocommit).await?;

        let version: String = sqlx::query_scalar("SELECT VERSION()")
            .fetch_one(&mut conn)
            .await?;
        info!("✅ Conectado a MySQL Server versión {}", version);
        info!("🗄️ Base de datos: {}", self.config.database);

        Ok(conn)
    }

    /// Reconectar si no hay conexión o si el servidor no responde al ping
    async fn ensure_connected<'a>(
        &self,
        slot: &'a mut Option<MySqlConnection>,
    ) -> DbResult<&'a mut MySqlConnection> {
        let alive = match slot.as_mut() {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        };
        if !alive {
            self.connect_locked(slot).await?;
        }
        slot.as_mut()
            .ok_or_else(|| DbError::Connection("no hay conexión disponible".to_string()))
    }
}

async fn run_statement(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[Param],
    fetch: bool,
) -> DbResult<QueryOutcome> {
    if fetch && is_select(query) {
        let rows = fetch_on(conn, query, params).await?;
        return Ok(QueryOutcome::Rows(rows.iter().map(row_to_record).collect()));
    }

    let mut tx = conn.begin().await?;
    match execute_on(&mut tx, query, params).await {
        Ok(done) => {
            tx.commit().await?;
            if fetch {
                Ok(QueryOutcome::Affected(done.rows_affected()))
            } else {
                Ok(QueryOutcome::Done)
            }
        }
        Err(e) => {
            rollback(tx).await;
            Err(e.into())
        }
    }
}

async fn run_batch(conn: &mut MySqlConnection, query: &str, rows: &[Vec<Param>]) -> DbResult<u64> {
    let mut tx = conn.begin().await?;
    let mut affected = 0;

    for params in rows {
        match execute_on(&mut tx, query, params).await {
            Ok(done) => affected += done.rows_affected(),
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        }
    }

    tx.commit().await?;
    Ok(affected)
}

async fn rollback(tx: Transaction<'_, sqlx::MySql>) {
    if let Err(e) = tx.rollback().await {
        warn!("⚠️ Error en rollback: {}", e);
    }
}

// Sin parámetros se usa el protocolo de texto, así también funcionan las
// sentencias que MySQL no permite preparar.
async fn execute_on(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[Param],
) -> Result<MySqlQueryResult, sqlx::Error> {
    if params.is_empty() {
        conn.execute(query).await
    } else {
        bind_params(sqlx::query(query), params).execute(conn).await
    }
}

async fn fetch_on(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[Param],
) -> Result<Vec<MySqlRow>, sqlx::Error> {
    if params.is_empty() {
        conn.fetch_all(query).await
    } else {
        bind_params(sqlx::query(query), params).fetch_all(conn).await
    }
}

lazy_static! {
    static ref SHARED: Result<DatabaseConnection, ConfigError> = DatabaseConnection::new_default();
}

/// Obtener la conexión compartida del proceso, reconectando si hace falta
pub async fn get_db_connection() -> DbResult<&'static DatabaseConnection> {
    let db = (*SHARED).as_ref().map_err(|e| DbError::from(e.clone()))?;
    if !db.check_connection().await {
        db.connect().await?;
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbErrorKind;
    use std::time::Duration;

    /// Configuración apuntando a un puerto donde no escucha nadie
    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            acquire_timeout: Duration::from_secs(1),
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let db = DatabaseConnection::new(unreachable_config());
        assert!(!db.is_connected().await);
        assert!(!db.check_connection().await);
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_no_connection() {
        let db = DatabaseConnection::new(unreachable_config());
        let err = db.connect().await.unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::Connection);
        assert!(!db.is_connected().await);
        assert!(!db.check_connection().await);
    }

    #[tokio::test]
    async fn test_execute_unreachable_returns_connection_error() {
        let db = DatabaseConnection::new(unreachable_config());
        let err = db.execute("SELECT 1", &[], true).await.unwrap_err();
        assert!(err.is_connection());
        assert!(!db.is_connected().await);

        let err = db
            .execute("UPDATE pacientes SET ativo = ?", &[Param::Bool(false)], false)
            .await
            .unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_execute_many_unreachable_returns_connection_error() {
        let db = DatabaseConnection::new(unreachable_config());
        let rows = vec![vec![Param::from("a")], vec![Param::from("b")]];
        let err = db
            .execute_many("INSERT INTO t (nome) VALUES (?)", &rows)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::Connection);
        assert!(!db.is_connected().await);
    }

    #[tokio::test]
    async fn test_disconnect_without_connection_is_noop() {
        let db = DatabaseConnection::new(unreachable_config());
        db.disconnect().await;
        db.disconnect().await;
        assert!(!db.is_connected().await);
    }

    #[test]
    fn test_query_outcome_accessors() {
        let outcome = QueryOutcome::Affected(3);
        assert_eq!(outcome.affected(), Some(3));
        assert!(outcome.rows().is_none());
        assert!(QueryOutcome::Done.affected().is_none());
        assert_eq!(QueryOutcome::Rows(vec![]).rows().map(|r| r.len()), Some(0));
    }
}
