use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::dto::dashboard_dto::DashboardStats;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::dashboard_service::DashboardService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardStats>, AppError> {
    let catalog = state.status_catalog().await;
    let service = DashboardService::new(state.pool.clone());
    let stats = service.stats(&user, &catalog).await?;
    Ok(Json(stats))
}
