use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::entreprise_dto::EntrepriseFilters;
use crate::models::entreprise::Entreprise;
use crate::repositories::like_pattern;
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

pub struct EntrepriseRepository {
    pool: PgPool,
}

impl EntrepriseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entreprise: &Entreprise) -> Result<Entreprise, AppError> {
        let created = sqlx::query_as::<_, Entreprise>(
            r#"
            INSERT INTO entreprises (
                id, name, siret, email, phone, address, city, contact_name, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(entreprise.id)
        .bind(&entreprise.name)
        .bind(&entreprise.siret)
        .bind(&entreprise.email)
        .bind(&entreprise.phone)
        .bind(&entreprise.address)
        .bind(&entreprise.city)
        .bind(&entreprise.contact_name)
        .bind(entreprise.created_at)
        .bind(entreprise.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Entreprise>, AppError> {
        let entreprise = sqlx::query_as::<_, Entreprise>("SELECT * FROM entreprises WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entreprise)
    }

    pub async fn siret_taken(&self, siret: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM entreprises WHERE siret = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(siret)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(
        &self,
        filters: &EntrepriseFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Entreprise>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM entreprises WHERE TRUE");
        push_entreprise_filters(&mut query, filters);
        query
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let entreprises = query.build_query_as::<Entreprise>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM entreprises WHERE TRUE");
        push_entreprise_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((entreprises, total))
    }

    pub async fn update(&self, entreprise: &Entreprise) -> Result<Entreprise, AppError> {
        let updated = sqlx::query_as::<_, Entreprise>(
            r#"
            UPDATE entreprises
            SET name = $2, siret = $3, email = $4, phone = $5, address = $6,
                city = $7, contact_name = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(entreprise.id)
        .bind(&entreprise.name)
        .bind(&entreprise.siret)
        .bind(&entreprise.email)
        .bind(&entreprise.phone)
        .bind(&entreprise.address)
        .bind(&entreprise.city)
        .bind(&entreprise.contact_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM entreprises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entreprises")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Prefiltro de la búsqueda global
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<Entreprise>, AppError> {
        let pattern = like_pattern(term);
        let entreprises = sqlx::query_as::<_, Entreprise>(
            r#"
            SELECT * FROM entreprises
            WHERE unaccent(name) ILIKE unaccent($1)
               OR unaccent(email) ILIKE unaccent($1)
               OR siret ILIKE $1
               OR unaccent(city) ILIKE unaccent($1)
            ORDER BY name ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entreprises)
    }
}

fn push_entreprise_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &EntrepriseFilters) {
    if let Some(term) = filters.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR city ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
