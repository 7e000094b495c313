use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::statut_dto::{CreateStatutRequest, UpdateStatutRequest};
use crate::models::statut::Statut;
use crate::repositories::statut_repository::StatutRepository;
use crate::utils::errors::{in_use_error, not_found_error, AppError};

/// CRUD del catálogo de estados; quien llama recarga el catálogo en memoria
pub struct StatutController {
    repository: StatutRepository,
}

impl StatutController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StatutRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreateStatutRequest) -> Result<ApiResponse<Statut>, AppError> {
        request.validate()?;

        let position = match request.position {
            Some(position) => position,
            None => self.repository.next_position().await?,
        };

        let statut = Statut {
            id: Uuid::new_v4(),
            code: request.code,
            label: request.label.trim().to_string(),
            color: request.color.to_lowercase(),
            position,
            is_final: request.is_final.unwrap_or(false),
            created_at: Utc::now(),
        };

        // Código repetido: violación de unicidad → 409
        let created = self.repository.create(&statut).await?;
        tracing::info!(code = %created.code, "🎨 Estado creado");

        Ok(ApiResponse::success_with_message(created, "Estado creado exitosamente"))
    }

    pub async fn update(&self, id: Uuid, request: UpdateStatutRequest) -> Result<ApiResponse<Statut>, AppError> {
        request.validate()?;

        let mut statut = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Statut", id))?;

        if let Some(label) = request.label {
            statut.label = label.trim().to_string();
        }
        if let Some(color) = request.color {
            statut.color = color.to_lowercase();
        }
        if let Some(position) = request.position {
            statut.position = position;
        }
        if let Some(is_final) = request.is_final {
            statut.is_final = is_final;
        }

        let updated = self.repository.update(&statut).await?;
        tracing::info!(code = %updated.code, "✏️ Estado actualizado");

        Ok(ApiResponse::success_with_message(updated, "Estado actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let statut = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Statut", id))?;

        let in_use = self.repository.usage_count(&statut.code).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "El estado '{}' lo usan {} colis",
                statut.code, in_use
            )));
        }
        if self.repository.list_all().await?.len() <= 1 {
            return Err(AppError::Conflict("El catálogo de estados no puede quedar vacío".to_string()));
        }

        self.repository
            .delete(id)
            .await
            .map_err(|e| in_use_error(e, "Statut"))?;
        tracing::info!(code = %statut.code, "🗑️ Estado eliminado");

        Ok(ApiResponse::message("Estado eliminado exitosamente"))
    }
}
