use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserRole;

// Filtros del listado de notificaciones propias
#[derive(Debug, Default, Deserialize)]
pub struct NotificationFilters {
    pub unread_only: Option<bool>,
}

// Mensaje de difusión (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub recipients: usize,
}
