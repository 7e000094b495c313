use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::controllers::user_controller::UserController;
use crate::dto::auth_dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::dto::common_dto::ApiResponse;
use crate::dto::user_dto::UserResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::ApiJson;

/// Rutas de sesión que requieren token
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/password", put(change_password))
}

/// Login público
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let response = service.login(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller.get_by_id(user.user_id).await?;
    Ok(Json(response))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    request.validate()?;

    let service = AuthService::new(state.pool.clone(), state.jwt.clone());
    service
        .change_password(user.user_id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Contraseña actualizada exitosamente")))
}
