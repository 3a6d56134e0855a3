//! Parámetros de consulta y decodificación de filas
//!
//! Las filas se devuelven como mapas `columna -> valor JSON`, en el orden de
//! las columnas del resultado.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, TypeInfo, ValueRef};
use tracing::warn;

/// Fila decodificada, indexada por nombre de columna
pub type Record = Map<String, Value>;

/// Valor escalar enlazado a un marcador `?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        Param::UInt(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<Vec<u8>> for Param {
    fn from(value: Vec<u8>) -> Self {
        Param::Bytes(value)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

/// Enlazar los parámetros en orden posicional
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Param],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Param::Null => query.bind(None::<String>),
            Param::Bool(v) => query.bind(*v),
            Param::Int(v) => query.bind(*v),
            Param::UInt(v) => query.bind(*v),
            Param::Float(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.as_str()),
            Param::Bytes(v) => query.bind(v.as_slice()),
        };
    }
    query
}

/// `true` si la sentencia empieza por `SELECT`, sin distinguir mayúsculas
pub fn is_select(query: &str) -> bool {
    query
        .trim_start()
        .get(..6)
        .map_or(false, |head| head.eq_ignore_ascii_case("SELECT"))
}

/// Convertir una fila de MySQL en un [`Record`]
pub fn row_to_record(row: &MySqlRow) -> Record {
    let mut record = Map::with_capacity(row.len());
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name());
        record.insert(column.name().to_string(), value);
    }
    record
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    match row.try_get_raw(idx) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    let decoded = match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(idx).map(Value::from),
        name if name.ends_with("UNSIGNED") => row.try_get::<u64, _>(idx).map(Value::from),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(idx).map(Value::from)
        }
        "FLOAT" => row.try_get::<f32, _>(idx).map(|v| Value::from(f64::from(v))),
        "DOUBLE" => row.try_get::<f64, _>(idx).map(Value::from),
        "DECIMAL" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .map(|v| Value::String(v.to_string())),
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .map(|v| Value::String(v.to_string())),
        "TIME" => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .map(|v| Value::String(v.to_string())),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string())),
        "JSON" => row.try_get::<Value, _>(idx),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            row.try_get::<Vec<u8>, _>(idx).map(Value::from)
        }
        _ => row.try_get::<String, _>(idx).map(Value::String),
    };

    decoded
        .or_else(|_| decode_fallback(row, idx))
        .unwrap_or_else(|e| {
            warn!("⚠️ No se pudo decodificar la columna {} ({}): {}", idx, type_name, e);
            Value::Null
        })
}

/// Probar los tipos más comunes cuando el nombre del tipo no basta
fn decode_fallback(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
    row.try_get::<i64, _>(idx)
        .map(Value::from)
        .or_else(|_| row.try_get::<u64, _>(idx).map(Value::from))
        .or_else(|_| row.try_get::<f64, _>(idx).map(Value::from))
        .or_else(|_| row.try_get::<String, _>(idx).map(Value::String))
        .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(Value::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_select_ignores_case_and_whitespace() {
        assert!(is_select("SELECT 1"));
        assert!(is_select("  select * from pacientes"));
        assert!(is_select("\n\tSeLeCt id FROM x\n"));
        assert!(!is_select("UPDATE pacientes SET nome = ?"));
        assert!(!is_select("INSERT INTO x SELECT * FROM y"));
        assert!(!is_select("SEL"));
        assert!(!is_select(""));
    }

    #[test]
    fn test_is_select_with_multibyte_prefix() {
        assert!(!is_select("ção SELECT"));
    }

    #[test]
    fn test_params_from_json() {
        let params: Vec<Param> =
            serde_json::from_value(json!([null, true, -3, 18446744073709551615u64, 1.5, "Maria"]))
                .unwrap();
        assert_eq!(
            params,
            vec![
                Param::Null,
                Param::Bool(true),
                Param::Int(-3),
                Param::UInt(u64::MAX),
                Param::Float(1.5),
                Param::Text("Maria".to_string()),
            ]
        );
    }

    #[test]
    fn test_param_conversions() {
        assert_eq!(Param::from(7), Param::Int(7));
        assert_eq!(Param::from("abc"), Param::Text("abc".to_string()));
        assert_eq!(Param::from(None::<i64>), Param::Null);
        assert_eq!(Param::from(Some(2.5)), Param::Float(2.5));
    }
}
