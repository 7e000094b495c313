use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::notification_controller::NotificationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::notification_dto::{BroadcastRequest, BroadcastResponse, NotificationFilters, UnreadCountResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::notification::Notification;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::pagination::{PageQuery, Paginated};

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/broadcast", post(broadcast))
        .route("/:id/read", put(mark_read))
        .route("/:id", delete(delete_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filters): ApiQuery<NotificationFilters>,
) -> Result<Json<Paginated<Notification>>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller
        .list(user.user_id, filters, state.pagination(page))
        .await?;
    Ok(Json(response))
}

async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.unread_count(user.user_id).await?;
    Ok(Json(response))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.mark_read(user.user_id, id).await?;
    Ok(Json(response))
}

async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.mark_all_read(user.user_id).await?;
    Ok(Json(response))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.delete(user.user_id, id).await?;
    Ok(Json(response))
}

async fn broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<BroadcastRequest>,
) -> Result<Json<ApiResponse<BroadcastResponse>>, AppError> {
    user.require_admin()?;
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.broadcast(request).await?;
    Ok(Json(response))
}
