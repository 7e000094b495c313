//! Servicio de autenticación
//!
//! Hash de contraseñas con bcrypt, login con JWT y creación del primer
//! administrador al arrancar.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::user::{User, UserRole};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

/// Mensaje único para cualquier fallo de credenciales
const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash).map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))
}

pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Email desconocido, contraseña errónea o usuario inactivo: mismo 401
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? || !user.active {
            tracing::warn!(email = %user.email, "🔒 Login rechazado");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(&user, &self.jwt)?;
        tracing::info!(user_id = %user.id, role = %user.role, "✅ Login correcto");

        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: self.jwt.expiration,
            user: user.into(),
        })
    }

    /// Cambiar la contraseña propia verificando la actual
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::Unauthorized("La contraseña actual no es correcta".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;
        tracing::info!(user_id = %user_id, "🔑 Contraseña actualizada");
        Ok(())
    }
}

/// Crear el administrador inicial si está configurado y no existe ninguno
pub async fn bootstrap_admin(pool: &PgPool, config: &EnvironmentConfig) -> Result<Option<Uuid>, AppError> {
    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(None);
    };

    let users = UserRepository::new(pool.clone());
    if users.count_admins().await? > 0 {
        return Ok(None);
    }
    if users.find_by_email(email).await?.is_some() {
        tracing::warn!("⚠️ El email del admin inicial ya existe con otro rol; no se crea");
        return Ok(None);
    }
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "BOOTSTRAP_ADMIN_PASSWORD must have at least 8 characters".to_string(),
        ));
    }

    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4(),
        email: email.trim().to_lowercase(),
        password_hash: hash_password(password)?,
        full_name: "Administrateur".to_string(),
        role: UserRole::Admin.as_str().to_string(),
        entreprise_id: None,
        livreur_id: None,
        active: true,
        created_at: now,
        updated_at: now,
    };
    let created = users.create(&admin).await?;

    tracing::info!(email = %created.email, "👤 Administrador inicial creado");
    Ok(Some(created.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hashed = hash_password("motdepasse-solide").unwrap();
        assert_ne!(hashed, "motdepasse-solide");
        assert!(verify_password("motdepasse-solide", &hashed).unwrap());
        assert!(!verify_password("autre-chose", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_a_hash_error() {
        assert!(matches!(verify_password("x", "not-a-bcrypt-hash"), Err(AppError::Hash(_))));
    }
}
