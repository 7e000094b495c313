use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::entreprise_controller::EntrepriseController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::entreprise_dto::{CreateEntrepriseRequest, EntrepriseFilters, UpdateEntrepriseRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::entreprise::Entreprise;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::pagination::{PageQuery, Paginated};

pub fn create_entreprise_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entreprises).post(create_entreprise))
        .route(
            "/:id",
            get(get_entreprise).put(update_entreprise).delete(delete_entreprise),
        )
}

async fn list_entreprises(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filters): ApiQuery<EntrepriseFilters>,
) -> Result<Json<Paginated<Entreprise>>, AppError> {
    user.require_staff()?;
    let controller = EntrepriseController::new(state.pool.clone());
    let response = controller.list(filters, state.pagination(page)).await?;
    Ok(Json(response))
}

async fn create_entreprise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateEntrepriseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Entreprise>>), AppError> {
    user.require_staff()?;
    let controller = EntrepriseController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_entreprise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Entreprise>, AppError> {
    user.require_staff()?;
    let controller = EntrepriseController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_entreprise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateEntrepriseRequest>,
) -> Result<Json<ApiResponse<Entreprise>>, AppError> {
    user.require_staff()?;
    let controller = EntrepriseController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_entreprise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_staff()?;
    let controller = EntrepriseController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
