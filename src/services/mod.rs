//! Services module
//!
//! Lógica de negocio que combina varios repositorios: catálogo de
//! estados, reparto de notificaciones, búsqueda global, dashboard y
//! autenticación.

pub mod auth_service;
pub mod dashboard_service;
pub mod notification_service;
pub mod search_service;
pub mod status_catalog;

pub use status_catalog::StatusCatalog;
