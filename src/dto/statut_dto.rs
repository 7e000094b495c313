use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_hex_color, validate_not_blank, validate_status_code};

// Request para crear un estado
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStatutRequest {
    #[validate(custom = "validate_status_code")]
    pub code: String,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub label: String,
    #[validate(custom = "validate_hex_color")]
    pub color: String,
    pub position: Option<i32>,
    pub is_final: Option<bool>,
}

// Request para actualizar un estado; el código es inmutable
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatutRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub label: Option<String>,
    #[validate(custom = "validate_hex_color")]
    pub color: Option<String>,
    pub position: Option<i32>,
    pub is_final: Option<bool>,
}
