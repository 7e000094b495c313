//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL definido en `migrations/`.

pub mod bon;
pub mod client;
pub mod colis;
pub mod entreprise;
pub mod livreur;
pub mod notification;
pub mod statut;
pub mod user;
