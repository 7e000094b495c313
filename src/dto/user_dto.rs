use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{User, UserRole};

// Request para crear un usuario (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 2, max = 255))]
    pub full_name: String,
    pub role: UserRole,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub active: Option<bool>,
}

// Request para actualizar un usuario (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 2, max = 255))]
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub active: Option<bool>,
}

// Filtros del listado de usuarios
#[derive(Debug, Default, Deserialize)]
pub struct UserFilters {
    pub role: Option<UserRole>,
    pub q: Option<String>,
}

// Response de usuario (sin password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            role: user.role(),
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            entreprise_id: user.entreprise_id,
            livreur_id: user.livreur_id,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
