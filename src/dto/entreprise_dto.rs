use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_phone, validate_siret};

// Request para crear una entreprise
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntrepriseRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(custom = "validate_siret")]
    pub siret: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
}

// Request para actualizar una entreprise
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntrepriseRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: Option<String>,
    #[validate(custom = "validate_siret")]
    pub siret: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
}

// Filtros del listado de entreprises
#[derive(Debug, Default, Deserialize)]
pub struct EntrepriseFilters {
    pub q: Option<String>,
}
