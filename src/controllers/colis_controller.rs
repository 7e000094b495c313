use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::colis_dto::{
    AssignLivreurRequest, ChangeStatusRequest, ColisFilters, ColisHistoryEntry, ColisResponse,
    CreateColisRequest, TrackingResponse, UpdateColisRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::colis::{Colis, ColisScope};
use crate::models::user::UserRole;
use crate::repositories::client_repository::ClientRepository;
use crate::repositories::colis_repository::ColisRepository;
use crate::repositories::livreur_repository::LivreurRepository;
use crate::services::notification_service::NotificationService;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::references::tracking_number;
use crate::utils::validation::{clean_filter, normalize_phone};

/// Un colis en un bon sigue al livreur del bon; hay que retirarlo antes
pub fn ensure_not_on_bon(colis: &Colis) -> Result<(), AppError> {
    if colis.bon_id.is_some() {
        return Err(AppError::Conflict(format!(
            "Colis {} is on a bon; detach it before changing its livreur",
            colis.tracking_number
        )));
    }
    Ok(())
}

pub struct ColisController {
    repository: ColisRepository,
    clients: ClientRepository,
    livreurs: LivreurRepository,
    notifications: NotificationService,
}

impl ColisController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ColisRepository::new(pool.clone()),
            clients: ClientRepository::new(pool.clone()),
            livreurs: LivreurRepository::new(pool.clone()),
            notifications: NotificationService::new(pool),
        }
    }

    /// Colis visible para el usuario; fuera de su alcance es un 404
    async fn find_visible(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Colis, AppError> {
        let colis = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Colis", id))?;

        if !ColisScope::for_user(user).allows(&colis) {
            return Err(not_found_error("Colis", id));
        }
        Ok(colis)
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: ColisFilters,
        pagination: Pagination,
        catalog: &StatusCatalog,
    ) -> Result<Paginated<ColisResponse>, AppError> {
        let scope = ColisScope::for_user(user);
        let (colis, total) = self.repository.list(&filters, scope, pagination).await?;

        Ok(Paginated::new(colis, total, pagination).map(|colis| ColisResponse::from_colis(colis, catalog)))
    }

    pub async fn get_by_id(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        catalog: &StatusCatalog,
    ) -> Result<ColisResponse, AppError> {
        let colis = self.find_visible(user, id).await?;
        Ok(ColisResponse::from_colis(colis, catalog))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateColisRequest,
        catalog: &StatusCatalog,
    ) -> Result<ApiResponse<ColisResponse>, AppError> {
        request.validate()?;

        let client = self
            .clients
            .find_by_id(request.client_id)
            .await?
            .ok_or_else(|| not_found_error("Client", request.client_id))?;

        let now = Utc::now();
        let colis = Colis {
            id: Uuid::new_v4(),
            tracking_number: tracking_number(now.date_naive()),
            client_id: client.id,
            // Sin entreprise explícita, hereda la del client
            entreprise_id: request.entreprise_id.or(client.entreprise_id),
            livreur_id: None,
            bon_id: None,
            status_code: catalog.initial().to_string(),
            description: clean_filter(request.description.as_deref()),
            weight_kg: request.weight_kg,
            price: request.price,
            recipient_name: request.recipient_name.trim().to_string(),
            recipient_phone: normalize_phone(&request.recipient_phone),
            delivery_address: request.delivery_address.trim().to_string(),
            delivery_city: clean_filter(request.delivery_city.as_deref()),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&colis, user.user_id).await?;
        tracing::info!(
            colis_id = %created.id,
            tracking = %created.tracking_number,
            "📦 Colis creado"
        );

        Ok(ApiResponse::success_with_message(
            ColisResponse::from_colis(created, catalog),
            "Colis creado exitosamente",
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateColisRequest,
        catalog: &StatusCatalog,
    ) -> Result<ApiResponse<ColisResponse>, AppError> {
        request.validate()?;

        let mut colis = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Colis", id))?;

        if let Some(client_id) = request.client_id {
            colis.client_id = client_id;
        }
        if request.entreprise_id.is_some() {
            colis.entreprise_id = request.entreprise_id;
        }
        if request.description.is_some() {
            colis.description = clean_filter(request.description.as_deref());
        }
        if request.weight_kg.is_some() {
            colis.weight_kg = request.weight_kg;
        }
        if request.price.is_some() {
            colis.price = request.price;
        }
        if let Some(name) = request.recipient_name {
            colis.recipient_name = name.trim().to_string();
        }
        if let Some(phone) = request.recipient_phone {
            colis.recipient_phone = normalize_phone(&phone);
        }
        if let Some(address) = request.delivery_address {
            colis.delivery_address = address.trim().to_string();
        }
        if request.delivery_city.is_some() {
            colis.delivery_city = clean_filter(request.delivery_city.as_deref());
        }

        let updated = self.repository.update(&colis).await?;
        tracing::info!(colis_id = %updated.id, "✏️ Colis actualizado");

        Ok(ApiResponse::success_with_message(
            ColisResponse::from_colis(updated, catalog),
            "Colis actualizado exitosamente",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Colis", id));
        }
        tracing::info!(colis_id = %id, "🗑️ Colis eliminado");

        Ok(ApiResponse::message("Colis eliminado exitosamente"))
    }

    /// Cambio de estado + historial, y después el reparto de notificaciones
    pub async fn change_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: ChangeStatusRequest,
        catalog: &StatusCatalog,
    ) -> Result<ApiResponse<ColisResponse>, AppError> {
        request.validate()?;

        if user.role == UserRole::Entreprise {
            return Err(forbidden_error("change status", "entreprise accounts are read-only"));
        }

        let scope = ColisScope::for_user(user);
        let target = request.status.trim();
        let comment = clean_filter(request.comment.as_deref());

        let (previous, updated) = self
            .repository
            .change_status(id, target, comment.as_deref(), user.user_id, |current| {
                if !scope.allows(current) {
                    return Err(not_found_error("Colis", id));
                }
                catalog.validate_transition(&current.status_code, target, user.is_admin())
            })
            .await?;
        tracing::info!(
            colis_id = %id,
            from = %previous.status_code,
            to = %updated.status_code,
            "🔄 Estado de colis actualizado"
        );

        // El cambio ya está confirmado: un fallo al notificar no lo revierte
        match self
            .notifications
            .notify_status_change(&updated, &previous.status_code, comment.as_deref(), user.user_id, catalog)
            .await
        {
            Ok(sent) => tracing::debug!(colis_id = %id, sent, "🔔 Notificaciones enviadas"),
            Err(e) => tracing::error!(colis_id = %id, "❌ Error notificando cambio de estado: {}", e),
        }

        Ok(ApiResponse::success_with_message(
            ColisResponse::from_colis(updated, catalog),
            format!("Estado actualizado a '{}'", catalog.label_for(target)),
        ))
    }

    pub async fn assign_livreur(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AssignLivreurRequest,
        catalog: &StatusCatalog,
    ) -> Result<ApiResponse<ColisResponse>, AppError> {
        if let Some(livreur_id) = request.livreur_id {
            if !self.livreurs.exists(livreur_id).await? {
                return Err(not_found_error("Livreur", livreur_id));
            }
        }

        let (previous, updated) = self
            .repository
            .assign_livreur(id, request.livreur_id, ensure_not_on_bon)
            .await?;
        tracing::info!(colis_id = %id, livreur_id = ?updated.livreur_id, "🚴 Livreur asignado");

        if let Some(livreur_id) = updated.livreur_id.filter(|l| previous.livreur_id != Some(*l)) {
            if let Err(e) = self.notifications.notify_assignment(&updated, livreur_id, user.user_id).await {
                tracing::error!(colis_id = %id, "❌ Error notificando asignación: {}", e);
            }
        }

        let message = if updated.livreur_id.is_some() {
            "Livreur asignado exitosamente"
        } else {
            "Livreur desasignado exitosamente"
        };
        Ok(ApiResponse::success_with_message(
            ColisResponse::from_colis(updated, catalog),
            message,
        ))
    }

    pub async fn history(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        catalog: &StatusCatalog,
    ) -> Result<Vec<ColisHistoryEntry>, AppError> {
        self.find_visible(user, id).await?;
        let history = self.repository.history(id).await?;

        Ok(history
            .into_iter()
            .map(|entry| ColisHistoryEntry::from_history(entry, catalog))
            .collect())
    }

    /// Seguimiento público por número de tracking
    pub async fn tracking(&self, number: &str, catalog: &StatusCatalog) -> Result<TrackingResponse, AppError> {
        let colis = self
            .repository
            .find_by_tracking(number.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tracking number '{}' not found", number.trim())))?;
        let history = self.repository.history(colis.id).await?;

        Ok(TrackingResponse::build(colis, history, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colis(bon_id: Option<Uuid>) -> Colis {
        Colis {
            id: Uuid::new_v4(),
            tracking_number: "COL-20250601-0A1B2C3D".to_string(),
            client_id: Uuid::new_v4(),
            entreprise_id: None,
            livreur_id: Some(Uuid::new_v4()),
            bon_id,
            status_code: "en_attente".to_string(),
            description: None,
            weight_kg: None,
            price: None,
            recipient_name: "Jean Dupont".to_string(),
            recipient_phone: "0612345678".to_string(),
            delivery_address: "1 rue de la Paix".to_string(),
            delivery_city: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn livreur_change_is_blocked_while_on_a_bon() {
        assert!(ensure_not_on_bon(&colis(None)).is_ok());
        assert!(matches!(ensure_not_on_bon(&colis(Some(Uuid::new_v4()))), Err(AppError::Conflict(_))));
    }
}
