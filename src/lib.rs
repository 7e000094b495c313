//! Back-office de colis
//!
//! API REST para gestionar clients, entreprises, livreurs, colis, bons de
//! livraison, estados y notificaciones.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app;
pub use state::AppState;
