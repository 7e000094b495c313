use sqlx::PgPool;
use uuid::Uuid;

use crate::models::statut::Statut;
use crate::utils::errors::AppError;

pub struct StatutRepository {
    pool: PgPool,
}

impl StatutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Statut>, AppError> {
        let statuses = sqlx::query_as::<_, Statut>("SELECT * FROM statuts ORDER BY position ASC, code ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(statuses)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Statut>, AppError> {
        let statut = sqlx::query_as::<_, Statut>("SELECT * FROM statuts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(statut)
    }

    pub async fn create(&self, statut: &Statut) -> Result<Statut, AppError> {
        let created = sqlx::query_as::<_, Statut>(
            r#"
            INSERT INTO statuts (id, code, label, color, position, is_final, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(statut.id)
        .bind(&statut.code)
        .bind(&statut.label)
        .bind(&statut.color)
        .bind(statut.position)
        .bind(statut.is_final)
        .bind(statut.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update(&self, statut: &Statut) -> Result<Statut, AppError> {
        let updated = sqlx::query_as::<_, Statut>(
            r#"
            UPDATE statuts
            SET label = $2, color = $3, position = $4, is_final = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(statut.id)
        .bind(&statut.label)
        .bind(&statut.color)
        .bind(statut.position)
        .bind(statut.is_final)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM statuts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Número de colis que usan un código de estado
    pub async fn usage_count(&self, code: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM colis WHERE status_code = $1")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn next_position(&self) -> Result<i32, AppError> {
        let position: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(position), 0) + 10 FROM statuts")
            .fetch_one(&self.pool)
            .await?;

        Ok(position)
    }
}
