//! Middleware del sistema
//!
//! Este módulo contiene el middleware de CORS y la captura de panics.

pub mod cors;
pub mod panic;

pub use cors::*;
pub use panic::*;
