//! Modelo de Livreur (repartidor)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Livreur - mapea exactamente a la tabla livreurs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Livreur {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub zone: Option<String>,
    pub vehicle: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Livreur {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
