//! Controllers
//!
//! Reglas de negocio por entidad sobre los repositorios. Los handlers de
//! `routes` crean un controller por request a partir del pool.

pub mod bon_controller;
pub mod client_controller;
pub mod colis_controller;
pub mod entreprise_controller;
pub mod livreur_controller;
pub mod notification_controller;
pub mod statut_controller;
pub mod user_controller;
