use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::colis::{Colis, ColisHistory};
use crate::services::status_catalog::StatusCatalog;
use crate::utils::validation::{validate_not_blank, validate_phone};

/// Peso y precio no pueden ser negativos
fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

// Request para crear un colis
#[derive(Debug, Deserialize, Validate)]
pub struct CreateColisRequest {
    pub client_id: Uuid,
    pub entreprise_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub weight_kg: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub recipient_name: String,
    #[validate(custom = "validate_phone")]
    pub recipient_phone: String,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub delivery_address: String,
    #[validate(length(max = 120))]
    pub delivery_city: Option<String>,
}

// Request para actualizar los datos de un colis (ni estado ni livreur)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateColisRequest {
    pub client_id: Option<Uuid>,
    pub entreprise_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub weight_kg: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub recipient_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub recipient_phone: Option<String>,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub delivery_address: Option<String>,
    #[validate(length(max = 120))]
    pub delivery_city: Option<String>,
}

// Cambio de estado
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

// Asignación de livreur; `null` desasigna
#[derive(Debug, Deserialize)]
pub struct AssignLivreurRequest {
    pub livreur_id: Option<Uuid>,
}

// Filtros del listado de colis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColisFilters {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub bon_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub q: Option<String>,
}

// Response de colis con la presentación de su estado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColisResponse {
    pub id: Uuid,
    pub tracking_number: String,
    pub client_id: Uuid,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub bon_id: Option<Uuid>,
    pub status_code: String,
    pub status_label: String,
    pub status_color: String,
    pub description: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub price: Option<Decimal>,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub delivery_address: String,
    pub delivery_city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ColisResponse {
    pub fn from_colis(colis: Colis, catalog: &StatusCatalog) -> Self {
        Self {
            status_label: catalog.label_for(&colis.status_code).to_string(),
            status_color: catalog.color_for(&colis.status_code).to_string(),
            id: colis.id,
            tracking_number: colis.tracking_number,
            client_id: colis.client_id,
            entreprise_id: colis.entreprise_id,
            livreur_id: colis.livreur_id,
            bon_id: colis.bon_id,
            status_code: colis.status_code,
            description: colis.description,
            weight_kg: colis.weight_kg,
            price: colis.price,
            recipient_name: colis.recipient_name,
            recipient_phone: colis.recipient_phone,
            delivery_address: colis.delivery_address,
            delivery_city: colis.delivery_city,
            created_at: colis.created_at,
            updated_at: colis.updated_at,
        }
    }
}

// Entrada del historial con su presentación
#[derive(Debug, Clone, Serialize)]
pub struct ColisHistoryEntry {
    pub status_code: String,
    pub status_label: String,
    pub status_color: String,
    pub comment: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ColisHistoryEntry {
    pub fn from_history(entry: ColisHistory, catalog: &StatusCatalog) -> Self {
        Self {
            status_label: catalog.label_for(&entry.status_code).to_string(),
            status_color: catalog.color_for(&entry.status_code).to_string(),
            status_code: entry.status_code,
            comment: entry.comment,
            changed_by: entry.changed_by,
            created_at: entry.created_at,
        }
    }
}

// Evento del seguimiento público (sin datos personales)
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    pub status_code: String,
    pub status_label: String,
    pub status_color: String,
    pub created_at: DateTime<Utc>,
}

// Seguimiento público de un colis
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResponse {
    pub tracking_number: String,
    pub status_code: String,
    pub status_label: String,
    pub status_color: String,
    pub is_final: bool,
    pub delivery_city: Option<String>,
    pub history: Vec<TrackingEvent>,
}

impl TrackingResponse {
    pub fn build(colis: Colis, history: Vec<ColisHistory>, catalog: &StatusCatalog) -> Self {
        let history = history
            .into_iter()
            .map(|entry| TrackingEvent {
                status_label: catalog.label_for(&entry.status_code).to_string(),
                status_color: catalog.color_for(&entry.status_code).to_string(),
                status_code: entry.status_code,
                created_at: entry.created_at,
            })
            .collect();

        Self {
            status_label: catalog.label_for(&colis.status_code).to_string(),
            status_color: catalog.color_for(&colis.status_code).to_string(),
            is_final: catalog.is_final(&colis.status_code),
            tracking_number: colis.tracking_number,
            status_code: colis.status_code,
            delivery_city: colis.delivery_city,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn negative_weight_is_rejected() {
        assert!(validate_non_negative(&Decimal::from_str("-0.5").unwrap()).is_err());
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("2.750").unwrap()).is_ok());
    }

    #[test]
    fn create_request_validation() {
        let request: CreateColisRequest = serde_json::from_value(serde_json::json!({
            "client_id": Uuid::new_v4(),
            "recipient_name": "Jeanne Martin",
            "recipient_phone": "06 11 22 33 44",
            "delivery_address": "12 avenue Foch",
            "weight_kg": "1.25",
            "price": 9.9
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let request: CreateColisRequest = serde_json::from_value(serde_json::json!({
            "client_id": Uuid::new_v4(),
            "recipient_name": "   ",
            "recipient_phone": "12",
            "delivery_address": "12 avenue Foch"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("recipient_name"));
        assert!(fields.contains_key("recipient_phone"));
    }
}
