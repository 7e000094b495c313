//! Utilidades JWT
//!
//! Este módulo contiene funciones helper para emitir y verificar
//! los tokens de sesión del back-office.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::user::{User, UserRole},
    utils::errors::AppError,
};

/// Claims del JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,                   // user_id
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entreprise_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livreur_id: Option<String>,
    pub exp: usize,                    // expiration timestamp
    pub iat: usize,                    // issued at timestamp
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Generar JWT token para un usuario
pub fn generate_token(user: &User, config: &JwtConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user.id.to_string(),
        role: user.role().as_str().to_string(),
        entreprise_id: user.entreprise_id.map(|id| id.to_string()),
        livreur_id: user.livreur_id.map(|id| id.to_string()),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Header Authorization debe comenzar con 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}

/// Campos tipados de los claims
pub struct ClaimsIdentity {
    pub user_id: Uuid,
    pub role: UserRole,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
}

impl TryFrom<JwtClaims> for ClaimsIdentity {
    type Error = AppError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        let parse_id = |raw: &str| {
            Uuid::parse_str(raw).map_err(|_| AppError::Jwt("Identificador inválido en el token".to_string()))
        };

        Ok(Self {
            user_id: parse_id(&claims.sub)?,
            role: claims
                .role
                .parse()
                .map_err(|_| AppError::Jwt("Rol inválido en el token".to_string()))?,
            entreprise_id: claims.entreprise_id.as_deref().map(parse_id).transpose()?,
            livreur_id: claims.livreur_id.as_deref().map(parse_id).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ops@example.fr".to_string(),
            password_hash: String::new(),
            full_name: "Ops".to_string(),
            role: role.to_string(),
            entreprise_id: Some(Uuid::new_v4()),
            livreur_id: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies_and_carries_links() {
        let user = user("entreprise");
        let token = generate_token(&user, &config()).unwrap();
        let identity = ClaimsIdentity::try_from(verify_token(&token, &config()).unwrap()).unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.role, UserRole::Entreprise);
        assert_eq!(identity.entreprise_id, user.entreprise_id);
        assert_eq!(identity.livreur_id, None);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token(&user("admin"), &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiration: 3600,
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Token abc").is_err());
        assert!(extract_token_from_header("Bearer   ").is_err());
    }
}
