use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, validate_phone};

// Request para crear un client
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub first_name: String,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub last_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    pub entreprise_id: Option<Uuid>,
}

// Request para actualizar un client
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub last_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    pub entreprise_id: Option<Uuid>,
}

// Filtros del listado de clients
#[derive(Debug, Default, Deserialize)]
pub struct ClientFilters {
    pub q: Option<String>,
    pub entreprise_id: Option<Uuid>,
}
