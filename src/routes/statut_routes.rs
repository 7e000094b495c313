use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::statut_controller::StatutController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::statut_dto::{CreateStatutRequest, UpdateStatutRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::statut::Statut;
use crate::services::status_catalog::LegendEntry;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath};

pub fn create_statut_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_statuts).post(create_statut))
        .route("/:id", put(update_statut).delete(delete_statut))
}

/// Leyenda pública de colores, en orden de `position`
pub async fn legend(State(state): State<AppState>) -> Json<Vec<LegendEntry>> {
    Json(state.status_catalog().await.legend())
}

async fn list_statuts(State(state): State<AppState>) -> Json<Vec<Statut>> {
    Json(state.status_catalog().await.statuses().to_vec())
}

async fn create_statut(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateStatutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Statut>>), AppError> {
    user.require_admin()?;
    let controller = StatutController::new(state.pool.clone());
    let response = controller.create(request).await?;
    state.reload_statuses().await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_statut(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateStatutRequest>,
) -> Result<Json<ApiResponse<Statut>>, AppError> {
    user.require_admin()?;
    let controller = StatutController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    state.reload_statuses().await?;
    Ok(Json(response))
}

async fn delete_statut(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_admin()?;
    let controller = StatutController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    state.reload_statuses().await?;
    Ok(Json(response))
}
