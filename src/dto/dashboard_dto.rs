use serde::Serialize;

use crate::dto::colis_dto::ColisResponse;

// Número de colis por estado, con su presentación
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub code: String,
    pub label: String,
    pub color: String,
    pub count: i64,
}

// Indicadores del dashboard
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub colis_by_status: Vec<StatusCount>,
    pub total_colis: i64,
    pub total_clients: i64,
    pub total_entreprises: i64,
    pub available_livreurs: i64,
    pub open_bons: i64,
    pub unread_notifications: i64,
    pub recent_colis: Vec<ColisResponse>,
}
