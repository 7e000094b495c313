use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::colis_dto::ColisResponse;
use crate::models::bon::{Bon, BonState};

// Request para crear un bon de distribution
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBonRequest {
    pub livreur_id: Uuid,
    pub delivery_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub colis_ids: Vec<Uuid>,
}

// Añadir colis a un bon existente
#[derive(Debug, Deserialize, Validate)]
pub struct AttachColisRequest {
    #[validate(length(min = 1, max = 500))]
    pub colis_ids: Vec<Uuid>,
}

// Filtros del listado de bons
#[derive(Debug, Default, Deserialize)]
pub struct BonFilters {
    pub livreur_id: Option<Uuid>,
    pub state: Option<BonState>,
    pub date: Option<NaiveDate>,
}

// Response de bon
#[derive(Debug, Clone, Serialize)]
pub struct BonResponse {
    pub id: Uuid,
    pub number: String,
    pub livreur_id: Uuid,
    pub delivery_date: NaiveDate,
    pub state: BonState,
    pub notes: Option<String>,
    pub colis_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BonResponse {
    pub fn from_bon(bon: Bon, colis_count: i64) -> Self {
        Self {
            state: bon.state(),
            id: bon.id,
            number: bon.number,
            livreur_id: bon.livreur_id,
            delivery_date: bon.delivery_date,
            notes: bon.notes,
            colis_count,
            created_at: bon.created_at,
            updated_at: bon.updated_at,
        }
    }
}

// Bon con el detalle de sus colis
#[derive(Debug, Clone, Serialize)]
pub struct BonDetailResponse {
    #[serde(flatten)]
    pub bon: BonResponse,
    pub colis: Vec<ColisResponse>,
}
