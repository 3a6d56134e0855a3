//! Utilidades del sistema
//!
//! Este módulo contiene el manejo de errores HTTP compartido por los handlers.

pub mod errors;

pub use errors::*;
