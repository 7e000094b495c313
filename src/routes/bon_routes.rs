use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::bon_controller::BonController;
use crate::dto::bon_dto::{AttachColisRequest, BonDetailResponse, BonFilters, BonResponse, CreateBonRequest};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::pagination::{PageQuery, Paginated};

pub fn create_bon_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bons).post(create_bon))
        .route("/:id", get(get_bon).delete(delete_bon))
        .route("/:id/colis", post(attach_colis))
        .route("/:id/colis/:colis_id", delete(detach_colis))
        .route("/:id/start", post(start_bon))
        .route("/:id/close", post(close_bon))
}

async fn list_bons(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filters): ApiQuery<BonFilters>,
) -> Result<Json<Paginated<BonResponse>>, AppError> {
    let controller = BonController::new(state.pool.clone());
    let response = controller.list(&user, filters, state.pagination(page)).await?;
    Ok(Json(response))
}

async fn create_bon(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateBonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BonResponse>>), AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_bon(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BonDetailResponse>, AppError> {
    let catalog = state.status_catalog().await;
    let controller = BonController::new(state.pool.clone());
    let response = controller.get_by_id(&user, id, &catalog).await?;
    Ok(Json(response))
}

async fn attach_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AttachColisRequest>,
) -> Result<Json<ApiResponse<BonResponse>>, AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.attach(id, request).await?;
    Ok(Json(response))
}

async fn detach_colis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath((id, colis_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.detach(id, colis_id).await?;
    Ok(Json(response))
}

async fn start_bon(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BonResponse>>, AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.start(id).await?;
    Ok(Json(response))
}

async fn close_bon(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BonResponse>>, AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.close(id).await?;
    Ok(Json(response))
}

async fn delete_bon(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_staff()?;
    let controller = BonController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
