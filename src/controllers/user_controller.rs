use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{User, UserRole};
use crate::repositories::user_repository::UserRepository;
use crate::services::auth_service::hash_password;
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, validation_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};

/// Vínculos que conserva un usuario según su rol.
/// `entreprise` exige entreprise_id y `livreur` exige livreur_id.
pub fn role_links(
    role: UserRole,
    entreprise_id: Option<Uuid>,
    livreur_id: Option<Uuid>,
) -> Result<(Option<Uuid>, Option<Uuid>), AppError> {
    match role {
        UserRole::Admin | UserRole::Gestionnaire => Ok((None, None)),
        UserRole::Entreprise => entreprise_id
            .map(|id| (Some(id), None))
            .ok_or_else(|| validation_error("entreprise_id", "required", "role entreprise requires entreprise_id")),
        UserRole::Livreur => livreur_id
            .map(|id| (None, Some(id)))
            .ok_or_else(|| validation_error("livreur_id", "required", "role livreur requires livreur_id")),
    }
}

pub struct UserController {
    repository: UserRepository,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    pub async fn list(&self, filters: UserFilters, pagination: Pagination) -> Result<Paginated<UserResponse>, AppError> {
        let (users, total) = self.repository.list(&filters, pagination).await?;
        Ok(Paginated::new(users, total, pagination).map(UserResponse::from))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))?;

        Ok(user.into())
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.repository.email_taken(&email, None).await? {
            return Err(conflict_error("User", "email", &email));
        }

        let (entreprise_id, livreur_id) = role_links(request.role, request.entreprise_id, request.livreur_id)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: hash_password(&request.password)?,
            full_name: request.full_name.trim().to_string(),
            role: request.role.as_str().to_string(),
            entreprise_id,
            livreur_id,
            active: request.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&user).await?;
        tracing::info!(user_id = %created.id, role = %created.role, "👤 Usuario creado");

        Ok(ApiResponse::success_with_message(created.into(), "Usuario creado exitosamente"))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))?;

        if id == actor.user_id {
            if request.active == Some(false) {
                return Err(forbidden_error("deactivate user", "an administrator cannot deactivate themself"));
            }
            if request.role.is_some_and(|role| role != UserRole::Admin) {
                return Err(forbidden_error("change role", "an administrator cannot demote themself"));
            }
        }

        if let Some(email) = request.email {
            let email = email.trim().to_lowercase();
            if self.repository.email_taken(&email, Some(id)).await? {
                return Err(conflict_error("User", "email", &email));
            }
            user.email = email;
        }
        if let Some(password) = request.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(full_name) = request.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(active) = request.active {
            user.active = active;
        }

        let role = request.role.unwrap_or_else(|| user.role());
        let (entreprise_id, livreur_id) = role_links(
            role,
            request.entreprise_id.or(user.entreprise_id),
            request.livreur_id.or(user.livreur_id),
        )?;
        user.role = role.as_str().to_string();
        user.entreprise_id = entreprise_id;
        user.livreur_id = livreur_id;

        let updated = self.repository.update(&user).await?;
        tracing::info!(user_id = %updated.id, "✏️ Usuario actualizado");

        Ok(ApiResponse::success_with_message(updated.into(), "Usuario actualizado exitosamente"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        if id == actor.user_id {
            return Err(forbidden_error("delete user", "an administrator cannot delete themself"));
        }

        if !self.repository.delete(id).await? {
            return Err(not_found_error("User", id));
        }
        tracing::info!(user_id = %id, "🗑️ Usuario eliminado");

        Ok(ApiResponse::message("Usuario eliminado exitosamente"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles_drop_links() {
        let links = role_links(UserRole::Gestionnaire, Some(Uuid::new_v4()), Some(Uuid::new_v4())).unwrap();
        assert_eq!(links, (None, None));
    }

    #[test]
    fn scoped_roles_require_their_link() {
        let entreprise = Uuid::new_v4();
        let livreur = Uuid::new_v4();

        assert_eq!(
            role_links(UserRole::Entreprise, Some(entreprise), Some(livreur)).unwrap(),
            (Some(entreprise), None)
        );
        assert_eq!(
            role_links(UserRole::Livreur, Some(entreprise), Some(livreur)).unwrap(),
            (None, Some(livreur))
        );
        assert!(matches!(
            role_links(UserRole::Entreprise, None, Some(livreur)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(role_links(UserRole::Livreur, None, None), Err(AppError::Validation(_))));
    }
}
