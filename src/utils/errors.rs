//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del back-office
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// SQLSTATE de Postgres para violación de unicidad
const PG_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE de Postgres para violación de clave foránea
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
            code: code.to_string(),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    /// Código HTTP asociado al error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(e) => match database_error_code(e) {
                Some(PG_UNIQUE_VIOLATION) => StatusCode::CONFLICT,
                Some(PG_FOREIGN_KEY_VIOLATION) => StatusCode::BAD_REQUEST,
                _ if matches!(e, sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Extraer el SQLSTATE de un error de base de datos, si lo hay
fn database_error_code(error: &sqlx::Error) -> Option<&'static str> {
    let code = error.as_database_error()?.code()?;
    match code.as_ref() {
        PG_UNIQUE_VIOLATION => Some(PG_UNIQUE_VIOLATION),
        PG_FOREIGN_KEY_VIOLATION => Some(PG_FOREIGN_KEY_VIOLATION),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Database(e) => match database_error_code(&e) {
                Some(PG_UNIQUE_VIOLATION) => {
                    tracing::warn!("⚠️ Violación de unicidad: {}", e);
                    ErrorResponse::new("Conflict", "A record with the same unique value already exists", "CONFLICT")
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    tracing::warn!("⚠️ Violación de clave foránea: {}", e);
                    ErrorResponse::new("Bad Request", "A referenced record does not exist or is still in use", "FOREIGN_KEY")
                }
                _ if matches!(e, sqlx::Error::RowNotFound) => {
                    ErrorResponse::new("Not Found", "Resource not found", "NOT_FOUND")
                }
                _ => {
                    tracing::error!("❌ Database error: {}", e);
                    ErrorResponse::new("Database Error", "An error occurred while accessing the database", "DB_ERROR")
                }
            },

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                ErrorResponse::new("Validation Error", "The provided data is invalid", "VALIDATION_ERROR")
                    .with_details(json!(e))
            }

            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED")
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden access: {}", msg);
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN")
            }

            AppError::NotFound(msg) => ErrorResponse::new("Not Found", msg, "NOT_FOUND"),

            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                ErrorResponse::new("Conflict", msg, "CONFLICT")
            }

            AppError::BadRequest(msg) => ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                ErrorResponse::new("Internal Server Error", "An unexpected error occurred", "INTERNAL_ERROR")
            }

            AppError::Jwt(msg) => {
                tracing::warn!("JWT error: {}", msg);
                ErrorResponse::new("JWT Error", msg, "JWT_ERROR")
            }

            AppError::Hash(msg) => {
                tracing::error!("❌ Hash error: {}", msg);
                ErrorResponse::new("Hash Error", "An error occurred while processing credentials", "HASH_ERROR")
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Función helper para crear errores de validación sobre un campo
pub fn validation_error(field: &'static str, code: &'static str, message: &str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Un borrado bloqueado por una clave foránea es un conflicto, no una petición inválida
pub fn in_use_error(error: AppError, resource: &str) -> AppError {
    match &error {
        AppError::Database(e) if database_error_code(e) == Some(PG_FOREIGN_KEY_VIOLATION) => {
            AppError::Conflict(format!("{} is still referenced and cannot be deleted", resource))
        }
        _ => error,
    }
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_http_status() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Jwt("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Hash("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_error_targets_field() {
        let err = validation_error("phone", "phone", "invalid phone number");
        match err {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("phone"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn helper_messages_include_context() {
        let err = not_found_error("Colis", "abc");
        assert_eq!(err.to_string(), "Not found: Colis with id 'abc' not found");

        let err = conflict_error("User", "email", "a@b.fr");
        assert!(err.to_string().contains("a@b.fr"));

        let err = forbidden_error("delete user", "self deletion");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn in_use_error_passes_other_errors_through() {
        let err = in_use_error(not_found_error("Client", "abc"), "Client");
        assert!(matches!(err, AppError::NotFound(_)));

        let err = in_use_error(AppError::Database(sqlx::Error::PoolTimedOut), "Client");
        assert!(matches!(err, AppError::Database(_)));
    }
}
