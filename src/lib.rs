//! SISAPA - Sistema de Informação de Saúde e Assistência Pública
//!
//! Servidor HTTP base y utilidades de conexión con MySQL.

pub mod api;
pub mod config;
pub mod database;
pub mod middleware;
pub mod state;
pub mod utils;
