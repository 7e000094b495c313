use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::entreprise_dto::{CreateEntrepriseRequest, EntrepriseFilters, UpdateEntrepriseRequest};
use crate::models::entreprise::Entreprise;
use crate::repositories::entreprise_repository::EntrepriseRepository;
use crate::utils::errors::{conflict_error, in_use_error, not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{clean_filter, normalize_phone};

pub struct EntrepriseController {
    repository: EntrepriseRepository,
}

impl EntrepriseController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: EntrepriseRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filters: EntrepriseFilters,
        pagination: Pagination,
    ) -> Result<Paginated<Entreprise>, AppError> {
        let (entreprises, total) = self.repository.list(&filters, pagination).await?;
        Ok(Paginated::new(entreprises, total, pagination))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Entreprise, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Entreprise", id))
    }

    pub async fn create(&self, request: CreateEntrepriseRequest) -> Result<ApiResponse<Entreprise>, AppError> {
        request.validate()?;

        let siret = clean_filter(request.siret.as_deref());
        if let Some(siret) = siret.as_deref() {
            if self.repository.siret_taken(siret, None).await? {
                return Err(conflict_error("Entreprise", "siret", siret));
            }
        }

        let now = Utc::now();
        let entreprise = Entreprise {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            siret,
            email: clean_filter(request.email.as_deref()).map(|e| e.to_lowercase()),
            phone: clean_filter(request.phone.as_deref()).map(|p| normalize_phone(&p)),
            address: clean_filter(request.address.as_deref()),
            city: clean_filter(request.city.as_deref()),
            contact_name: clean_filter(request.contact_name.as_deref()),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&entreprise).await?;
        tracing::info!(entreprise_id = %created.id, name = %created.name, "🏢 Entreprise creada");

        Ok(ApiResponse::success_with_message(created, "Entreprise creada exitosamente"))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateEntrepriseRequest,
    ) -> Result<ApiResponse<Entreprise>, AppError> {
        request.validate()?;

        let mut entreprise = self.get_by_id(id).await?;

        if let Some(name) = request.name {
            entreprise.name = name.trim().to_string();
        }
        if let Some(siret) = request.siret {
            let siret = siret.trim().to_string();
            if self.repository.siret_taken(&siret, Some(id)).await? {
                return Err(conflict_error("Entreprise", "siret", &siret));
            }
            entreprise.siret = Some(siret);
        }
        if request.email.is_some() {
            entreprise.email = clean_filter(request.email.as_deref()).map(|e| e.to_lowercase());
        }
        if request.phone.is_some() {
            entreprise.phone = clean_filter(request.phone.as_deref()).map(|p| normalize_phone(&p));
        }
        if request.address.is_some() {
            entreprise.address = clean_filter(request.address.as_deref());
        }
        if request.city.is_some() {
            entreprise.city = clean_filter(request.city.as_deref());
        }
        if request.contact_name.is_some() {
            entreprise.contact_name = clean_filter(request.contact_name.as_deref());
        }

        let updated = self.repository.update(&entreprise).await?;
        tracing::info!(entreprise_id = %updated.id, "✏️ Entreprise actualizada");

        Ok(ApiResponse::success_with_message(updated, "Entreprise actualizada exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| in_use_error(e, "Entreprise"))?;
        if !deleted {
            return Err(not_found_error("Entreprise", id));
        }
        tracing::info!(entreprise_id = %id, "🗑️ Entreprise eliminada");

        Ok(ApiResponse::message("Entreprise eliminada exitosamente"))
    }
}
