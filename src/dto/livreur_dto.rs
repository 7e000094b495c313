use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, validate_phone};

// Request para crear un livreur
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLivreurRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub first_name: String,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub last_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 120))]
    pub zone: Option<String>,
    #[validate(length(max = 120))]
    pub vehicle: Option<String>,
    pub available: Option<bool>,
}

// Request para actualizar un livreur
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLivreurRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub last_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 120))]
    pub zone: Option<String>,
    #[validate(length(max = 120))]
    pub vehicle: Option<String>,
    pub available: Option<bool>,
}

// Cambio de disponibilidad
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

// Filtros del listado de livreurs
#[derive(Debug, Default, Deserialize)]
pub struct LivreurFilters {
    pub q: Option<String>,
    pub available: Option<bool>,
    pub zone: Option<String>,
}
