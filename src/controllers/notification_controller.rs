use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::notification_dto::{BroadcastRequest, BroadcastResponse, NotificationFilters, UnreadCountResponse};
use crate::models::notification::Notification;
use crate::repositories::notification_repository::NotificationRepository;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};

/// Bandeja de notificaciones propia; nunca expone las de otro usuario
pub struct NotificationController {
    repository: NotificationRepository,
    service: NotificationService,
}

impl NotificationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool.clone()),
            service: NotificationService::new(pool),
        }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        filters: NotificationFilters,
        pagination: Pagination,
    ) -> Result<Paginated<Notification>, AppError> {
        let (notifications, total) = self.repository.list_for_user(user_id, &filters, pagination).await?;
        Ok(Paginated::new(notifications, total, pagination))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<UnreadCountResponse, AppError> {
        let unread = self.repository.unread_count(user_id).await?;
        Ok(UnreadCountResponse { unread })
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<ApiResponse<Notification>, AppError> {
        let notification = self
            .repository
            .mark_read(id, user_id)
            .await?
            .ok_or_else(|| not_found_error("Notification", id))?;

        Ok(ApiResponse::success(notification))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let updated = self.repository.mark_all_read(user_id).await?;
        Ok(ApiResponse::message(format!("{} notificaciones marcadas como leídas", updated)))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        if !self.repository.delete(id, user_id).await? {
            return Err(not_found_error("Notification", id));
        }
        Ok(ApiResponse::message("Notificación eliminada"))
    }

    pub async fn broadcast(&self, request: BroadcastRequest) -> Result<ApiResponse<BroadcastResponse>, AppError> {
        request.validate()?;

        let recipients = self
            .service
            .broadcast(request.title.trim(), request.message.trim(), request.role)
            .await?;
        tracing::info!(recipients, role = ?request.role, "📣 Difusión enviada");

        Ok(ApiResponse::success_with_message(
            BroadcastResponse { recipients },
            format!("Mensaje enviado a {} usuarios", recipients),
        ))
    }
}
