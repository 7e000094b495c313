//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de permisos del usuario autenticado.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    models::user::{User, UserRole},
    repositories::user_repository::UserRepository,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token, ClaimsIdentity},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Exigir rol admin
    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.is_admin() {
            return Err(AppError::Forbidden("Se requieren permisos de administrador".to_string()));
        }
        Ok(())
    }

    /// Exigir personal interno (admin o gestionnaire)
    pub fn require_staff(&self) -> Result<(), AppError> {
        if !self.is_staff() {
            return Err(AppError::Forbidden("Operación reservada al personal interno".to_string()));
        }
        Ok(())
    }
}

/// Identidad efectiva a partir de la fila actual del usuario.
/// Usuario borrado o desactivado: 401 aunque el token siga vigente.
pub fn identity_from_row(user: Option<User>) -> Result<AuthenticatedUser, AppError> {
    let user = user
        .filter(|user| user.active)
        .ok_or_else(|| AppError::Unauthorized("Usuario inexistente o desactivado".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        role: user.role(),
        entreprise_id: user.entreprise_id,
        livreur_id: user.livreur_id,
    })
}

/// Middleware de autenticación JWT
///
/// El token identifica al usuario; rol y vínculos se leen de la base en
/// cada request para que los cambios del admin se apliquen de inmediato.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;
    let identity = ClaimsIdentity::try_from(claims)?;

    let row = UserRepository::new(state.pool.clone())
        .find_by_id(identity.user_id)
        .await?;
    let user = identity_from_row(row)?;

    if user.role != identity.role {
        tracing::debug!(user_id = %user.user_id, "🔄 Rol cambiado desde la emisión del token");
    }
    tracing::debug!(user_id = %user.user_id, role = %user.role, "🔐 Request autenticada");

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
