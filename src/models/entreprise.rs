//! Modelo de Entreprise (cliente empresa asociado)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Entreprise - mapea exactamente a la tabla entreprises
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entreprise {
    pub id: Uuid,
    pub name: String,
    pub siret: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
