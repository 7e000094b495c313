//! Módulo de base de datos
//!
//! Conexión a PostgreSQL y migraciones embebidas

pub mod connection;

pub use connection::{connect, run_migrations};
