use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::notification_dto::NotificationFilters;
use crate::models::notification::{NewNotification, Notification};
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserta todas las notificaciones de un envío en una transacción
    pub async fn insert_many(&self, notifications: &[NewNotification]) -> Result<usize, AppError> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for notification in notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (id, user_id, title, message, kind, colis_id, read, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(notification.user_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.kind.as_str())
            .bind(notification.colis_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(notifications.len())
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        filters: &NotificationFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let unread_only = filters.unread_only.unwrap_or(false);

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE user_id = ");
        query.push_bind(user_id);
        if unread_only {
            query.push(" AND NOT read");
        }
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let notifications = query.build_query_as::<Notification>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications WHERE user_id = ");
        count.push_bind(user_id);
        if unread_only {
            count.push(" AND NOT read");
        }
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((notifications, total))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Marca como leída una notificación propia; `None` si no existe o es ajena
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
