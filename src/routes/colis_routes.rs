use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::colis_controller::ColisController;
use crate::dto::colis_dto::{
    AssignLivreurRequest, ChangeStatusRequest, ColisFilters, ColisHistoryEntry, ColisResponse,
    CreateColisRequest, TrackingResponse, UpdateColisRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::pagination::{PageQuery, Paginated};

pub fn create_colis_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_colis).post(create_colis))
        .route("/:id", get(get_colis).put(update_colis).delete(delete_colis))
        .route("/:id/status", post(change_status))
        .route("/:id/livreur", put(assign_livreur))
        .route("/:id/history", get(history))
}

/// Seguimiento público por número de tracking
pub async fn tracking(
    State(state): State<AppState>,
    ApiPath(number): ApiPath<String>,
) -> Result<Json<TrackingResponse>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.tracking(&number, &catalog).await?;
    Ok(Json(response))
}

async fn list_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filters): ApiQuery<ColisFilters>,
) -> Result<Json<Paginated<ColisResponse>>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller
        .list(&user, filters, state.pagination(page), &catalog)
        .await?;
    Ok(Json(response))
}

async fn create_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateColisRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ColisResponse>>), AppError> {
    user.require_staff()?;
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.create(&user, request, &catalog).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ColisResponse>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.get_by_id(&user, id, &catalog).await?;
    Ok(Json(response))
}

async fn update_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateColisRequest>,
) -> Result<Json<ApiResponse<ColisResponse>>, AppError> {
    user.require_staff()?;
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.update(id, request, &catalog).await?;
    Ok(Json(response))
}

async fn delete_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_staff()?;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn change_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<ColisResponse>>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.change_status(&user, id, request, &catalog).await?;
    Ok(Json(response))
}

async fn assign_livreur(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AssignLivreurRequest>,
) -> Result<Json<ApiResponse<ColisResponse>>, AppError> {
    user.require_staff()?;
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.assign_livreur(&user, id, request, &catalog).await?;
    Ok(Json(response))
}

async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<ColisHistoryEntry>>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = ColisController::new(state.pool.clone());
    let response = controller.history(&user, id, &catalog).await?;
    Ok(Json(response))
}
