use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::livreur_dto::{CreateLivreurRequest, LivreurFilters, UpdateLivreurRequest};
use crate::models::livreur::Livreur;
use crate::repositories::livreur_repository::LivreurRepository;
use crate::utils::errors::{in_use_error, not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{clean_filter, normalize_phone};

pub struct LivreurController {
    repository: LivreurRepository,
}

impl LivreurController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LivreurRepository::new(pool),
        }
    }

    pub async fn list(&self, filters: LivreurFilters, pagination: Pagination) -> Result<Paginated<Livreur>, AppError> {
        let (livreurs, total) = self.repository.list(&filters, pagination).await?;
        Ok(Paginated::new(livreurs, total, pagination))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Livreur, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Livreur", id))
    }

    pub async fn create(&self, request: CreateLivreurRequest) -> Result<ApiResponse<Livreur>, AppError> {
        request.validate()?;

        let now = Utc::now();
        let livreur = Livreur {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            phone: normalize_phone(&request.phone),
            email: clean_filter(request.email.as_deref()).map(|e| e.to_lowercase()),
            zone: clean_filter(request.zone.as_deref()),
            vehicle: clean_filter(request.vehicle.as_deref()),
            available: request.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&livreur).await?;
        tracing::info!(livreur_id = %created.id, "🚴 Livreur creado");

        Ok(ApiResponse::success_with_message(created, "Livreur creado exitosamente"))
    }

    pub async fn update(&self, id: Uuid, request: UpdateLivreurRequest) -> Result<ApiResponse<Livreur>, AppError> {
        request.validate()?;

        let mut livreur = self.get_by_id(id).await?;

        if let Some(first_name) = request.first_name {
            livreur.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            livreur.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            livreur.phone = normalize_phone(&phone);
        }
        if request.email.is_some() {
            livreur.email = clean_filter(request.email.as_deref()).map(|e| e.to_lowercase());
        }
        if request.zone.is_some() {
            livreur.zone = clean_filter(request.zone.as_deref());
        }
        if request.vehicle.is_some() {
            livreur.vehicle = clean_filter(request.vehicle.as_deref());
        }
        if let Some(available) = request.available {
            livreur.available = available;
        }

        let updated = self.repository.update(&livreur).await?;
        tracing::info!(livreur_id = %updated.id, "✏️ Livreur actualizado");

        Ok(ApiResponse::success_with_message(updated, "Livreur actualizado exitosamente"))
    }

    pub async fn set_availability(&self, id: Uuid, available: bool) -> Result<ApiResponse<Livreur>, AppError> {
        let livreur = self
            .repository
            .set_availability(id, available)
            .await?
            .ok_or_else(|| not_found_error("Livreur", id))?;
        tracing::info!(livreur_id = %id, available, "🔁 Disponibilidad actualizada");

        Ok(ApiResponse::success(livreur))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| in_use_error(e, "Livreur"))?;
        if !deleted {
            return Err(not_found_error("Livreur", id));
        }
        tracing::info!(livreur_id = %id, "🗑️ Livreur eliminado");

        Ok(ApiResponse::message("Livreur eliminado exitosamente"))
    }
}
