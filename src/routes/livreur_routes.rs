use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::livreur_controller::LivreurController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::livreur_dto::{AvailabilityRequest, CreateLivreurRequest, LivreurFilters, UpdateLivreurRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::livreur::Livreur;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::pagination::{PageQuery, Paginated};

pub fn create_livreur_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_livreurs).post(create_livreur))
        .route("/:id", get(get_livreur).put(update_livreur).delete(delete_livreur))
        .route("/:id/availability", patch(set_availability))
}

async fn list_livreurs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filters): ApiQuery<LivreurFilters>,
) -> Result<Json<Paginated<Livreur>>, AppError> {
    user.require_staff()?;
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.list(filters, state.pagination(page)).await?;
    Ok(Json(response))
}

async fn create_livreur(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateLivreurRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Livreur>>), AppError> {
    user.require_staff()?;
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Un livreur puede consultar su propia ficha
async fn get_livreur(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Livreur>, AppError> {
    if user.livreur_id != Some(id) {
        user.require_staff()?;
    }
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_livreur(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateLivreurRequest>,
) -> Result<Json<ApiResponse<Livreur>>, AppError> {
    user.require_staff()?;
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn set_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AvailabilityRequest>,
) -> Result<Json<ApiResponse<Livreur>>, AppError> {
    user.require_staff()?;
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.set_availability(id, request.available).await?;
    Ok(Json(response))
}

async fn delete_livreur(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_staff()?;
    let controller = LivreurController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
