use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::client_dto::ClientFilters;
use crate::models::client::Client;
use crate::repositories::like_pattern;
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, client: &Client) -> Result<Client, AppError> {
        let created = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                id, first_name, last_name, phone, email, address, city,
                entreprise_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.city)
        .bind(client.entreprise_id)
        .bind(client.created_at)
        .bind(client.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn list(
        &self,
        filters: &ClientFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Client>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM clients WHERE TRUE");
        push_client_filters(&mut query, filters);
        query
            .push(" ORDER BY last_name ASC, first_name ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let clients = query.build_query_as::<Client>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients WHERE TRUE");
        push_client_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((clients, total))
    }

    pub async fn update(&self, client: &Client) -> Result<Client, AppError> {
        let updated = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET first_name = $2, last_name = $3, phone = $4, email = $5, address = $6,
                city = $7, entreprise_id = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.city)
        .bind(client.entreprise_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Prefiltro de la búsqueda global
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<Client>, AppError> {
        let pattern = like_pattern(term);
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE unaccent(first_name) ILIKE unaccent($1)
               OR unaccent(last_name) ILIKE unaccent($1)
               OR unaccent(first_name || ' ' || last_name) ILIKE unaccent($1)
               OR phone ILIKE $1
               OR unaccent(email) ILIKE unaccent($1)
            ORDER BY last_name ASC, first_name ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }
}

fn push_client_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ClientFilters) {
    if let Some(entreprise_id) = filters.entreprise_id {
        query.push(" AND entreprise_id = ").push_bind(entreprise_id);
    }
    if let Some(term) = filters.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND ((first_name || ' ' || last_name) ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
