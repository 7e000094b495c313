//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, paginación y generación de referencias.

pub mod errors;
pub mod extract;
pub mod jwt;
pub mod pagination;
pub mod references;
pub mod text;
pub mod validation;
