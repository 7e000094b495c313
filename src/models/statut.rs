//! Modelo de Statut
//!
//! Los estados de colis son datos (tabla `statuts`), no un enum fijo:
//! el catálogo en memoria vive en `services::status_catalog`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Statut - mapea exactamente a la tabla statuts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Statut {
    pub id: Uuid,
    pub code: String,
    pub label: String,
    pub color: String,
    pub position: i32,
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
}
