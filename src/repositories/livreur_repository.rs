use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::livreur_dto::LivreurFilters;
use crate::models::livreur::Livreur;
use crate::repositories::like_pattern;
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

pub struct LivreurRepository {
    pool: PgPool,
}

impl LivreurRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, livreur: &Livreur) -> Result<Livreur, AppError> {
        let created = sqlx::query_as::<_, Livreur>(
            r#"
            INSERT INTO livreurs (
                id, first_name, last_name, phone, email, zone, vehicle,
                available, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(livreur.id)
        .bind(&livreur.first_name)
        .bind(&livreur.last_name)
        .bind(&livreur.phone)
        .bind(&livreur.email)
        .bind(&livreur.zone)
        .bind(&livreur.vehicle)
        .bind(livreur.available)
        .bind(livreur.created_at)
        .bind(livreur.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Livreur>, AppError> {
        let livreur = sqlx::query_as::<_, Livreur>("SELECT * FROM livreurs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(livreur)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM livreurs WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    pub async fn list(
        &self,
        filters: &LivreurFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Livreur>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM livreurs WHERE TRUE");
        push_livreur_filters(&mut query, filters);
        query
            .push(" ORDER BY last_name ASC, first_name ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let livreurs = query.build_query_as::<Livreur>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM livreurs WHERE TRUE");
        push_livreur_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((livreurs, total))
    }

    pub async fn update(&self, livreur: &Livreur) -> Result<Livreur, AppError> {
        let updated = sqlx::query_as::<_, Livreur>(
            r#"
            UPDATE livreurs
            SET first_name = $2, last_name = $3, phone = $4, email = $5, zone = $6,
                vehicle = $7, available = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(livreur.id)
        .bind(&livreur.first_name)
        .bind(&livreur.last_name)
        .bind(&livreur.phone)
        .bind(&livreur.email)
        .bind(&livreur.zone)
        .bind(&livreur.vehicle)
        .bind(livreur.available)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn set_availability(&self, id: Uuid, available: bool) -> Result<Option<Livreur>, AppError> {
        let livreur = sqlx::query_as::<_, Livreur>(
            "UPDATE livreurs SET available = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(available)
        .fetch_optional(&self.pool)
        .await?;

        Ok(livreur)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM livreurs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_available(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM livreurs WHERE available")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Prefiltro de la búsqueda global
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<Livreur>, AppError> {
        let pattern = like_pattern(term);
        let livreurs = sqlx::query_as::<_, Livreur>(
            r#"
            SELECT * FROM livreurs
            WHERE unaccent(first_name) ILIKE unaccent($1)
               OR unaccent(last_name) ILIKE unaccent($1)
               OR unaccent(first_name || ' ' || last_name) ILIKE unaccent($1)
               OR phone ILIKE $1
               OR unaccent(zone) ILIKE unaccent($1)
            ORDER BY last_name ASC, first_name ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(livreurs)
    }
}

fn push_livreur_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &LivreurFilters) {
    if let Some(available) = filters.available {
        query.push(" AND available = ").push_bind(available);
    }
    if let Some(zone) = filters.zone.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
        query.push(" AND zone ILIKE ").push_bind(zone.to_string());
    }
    if let Some(term) = filters.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND ((first_name || ' ' || last_name) ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
