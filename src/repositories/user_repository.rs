use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::user_dto::UserFilters;
use crate::models::user::{NotificationTarget, User, UserRole};
use crate::repositories::like_pattern;
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, password_hash, full_name, role,
                entreprise_id, livreur_id, active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.role)
        .bind(user.entreprise_id)
        .bind(user.livreur_id)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// ¿Existe otro usuario con este email?
    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn count_admins(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND active")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn list(
        &self,
        filters: &UserFilters,
        pagination: Pagination,
    ) -> Result<(Vec<User>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        push_user_filters(&mut query, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((users, total))
    }

    pub async fn update(&self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, full_name = $4, role = $5,
                entreprise_id = $6, livreur_id = $7, active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.role)
        .bind(user.entreprise_id)
        .bind(user.livreur_id)
        .bind(user.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Candidatos a notificación de un colis: personal interno, usuarios de
    /// la entreprise y usuario del livreur, todos activos
    pub async fn notification_targets(
        &self,
        entreprise_id: Option<Uuid>,
        livreur_id: Option<Uuid>,
    ) -> Result<Vec<NotificationTarget>, AppError> {
        let targets = sqlx::query_as::<_, NotificationTarget>(
            r#"
            SELECT id, role, entreprise_id, livreur_id
            FROM users
            WHERE active
              AND (
                role IN ('admin', 'gestionnaire')
                OR ($1::uuid IS NOT NULL AND entreprise_id = $1)
                OR ($2::uuid IS NOT NULL AND livreur_id = $2)
              )
            "#,
        )
        .bind(entreprise_id)
        .bind(livreur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(targets)
    }

    /// Usuarios activos vinculados a un livreur
    pub async fn active_ids_for_livreur(&self, livreur_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE active AND livreur_id = $1")
            .bind(livreur_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Usuarios activos, opcionalmente de un rol
    pub async fn active_ids(&self, role: Option<UserRole>) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE active AND ($1::text IS NULL OR role = $1)")
            .bind(role.map(|r| r.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}

fn push_user_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &UserFilters) {
    if let Some(role) = filters.role {
        query.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(term) = filters.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR full_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
