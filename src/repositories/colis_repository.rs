use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::dto::colis_dto::ColisFilters;
use crate::models::colis::{Colis, ColisHistory, ColisScope};
use crate::repositories::like_pattern;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::Pagination;

pub struct ColisRepository {
    pool: PgPool,
}

impl ColisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserta el colis y su primera entrada de historial en una transacción
    pub async fn create(&self, colis: &Colis, created_by: Uuid) -> Result<Colis, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Colis>(
            r#"
            INSERT INTO colis (
                id, tracking_number, client_id, entreprise_id, livreur_id, bon_id, status_code,
                description, weight_kg, price, recipient_name, recipient_phone,
                delivery_address, delivery_city, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(colis.id)
        .bind(&colis.tracking_number)
        .bind(colis.client_id)
        .bind(colis.entreprise_id)
        .bind(colis.livreur_id)
        .bind(colis.bon_id)
        .bind(&colis.status_code)
        .bind(&colis.description)
        .bind(colis.weight_kg)
        .bind(colis.price)
        .bind(&colis.recipient_name)
        .bind(&colis.recipient_phone)
        .bind(&colis.delivery_address)
        .bind(&colis.delivery_city)
        .bind(colis.created_at)
        .bind(colis.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO colis_history (id, colis_id, status_code, comment, changed_by, created_at)
            VALUES ($1, $2, $3, NULL, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(&created.status_code)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Colis>, AppError> {
        let colis = sqlx::query_as::<_, Colis>("SELECT * FROM colis WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(colis)
    }

    pub async fn find_by_tracking(&self, tracking_number: &str) -> Result<Option<Colis>, AppError> {
        let colis = sqlx::query_as::<_, Colis>("SELECT * FROM colis WHERE UPPER(tracking_number) = UPPER($1)")
            .bind(tracking_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(colis)
    }

    pub async fn find_by_bon(&self, bon_id: Uuid) -> Result<Vec<Colis>, AppError> {
        let colis = sqlx::query_as::<_, Colis>(
            "SELECT * FROM colis WHERE bon_id = $1 ORDER BY delivery_city ASC NULLS LAST, created_at ASC",
        )
        .bind(bon_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(colis)
    }

    pub async fn list(
        &self,
        filters: &ColisFilters,
        scope: ColisScope,
        pagination: Pagination,
    ) -> Result<(Vec<Colis>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM colis WHERE TRUE");
        push_scope(&mut query, scope);
        push_colis_filters(&mut query, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let colis = query.build_query_as::<Colis>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM colis WHERE TRUE");
        push_scope(&mut count, scope);
        push_colis_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((colis, total))
    }

    /// Actualiza los datos editables (ni estado, ni livreur, ni bon)
    pub async fn update(&self, colis: &Colis) -> Result<Colis, AppError> {
        let updated = sqlx::query_as::<_, Colis>(
            r#"
            UPDATE colis
            SET client_id = $2, entreprise_id = $3, description = $4, weight_kg = $5, price = $6,
                recipient_name = $7, recipient_phone = $8, delivery_address = $9,
                delivery_city = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(colis.id)
        .bind(colis.client_id)
        .bind(colis.entreprise_id)
        .bind(&colis.description)
        .bind(colis.weight_kg)
        .bind(colis.price)
        .bind(&colis.recipient_name)
        .bind(&colis.recipient_phone)
        .bind(&colis.delivery_address)
        .bind(&colis.delivery_city)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM colis WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fila del colis bloqueada hasta el final de la transacción
    async fn lock(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Colis, AppError> {
        sqlx::query_as::<_, Colis>("SELECT * FROM colis WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| not_found_error("Colis", id))
    }

    /// Cambia el estado y registra el historial en una transacción.
    ///
    /// `check` valida el cambio contra la fila bloqueada, así dos cambios
    /// simultáneos nunca parten del mismo estado. Devuelve `(anterior, nuevo)`.
    pub async fn change_status<F>(
        &self,
        id: Uuid,
        status_code: &str,
        comment: Option<&str>,
        changed_by: Uuid,
        check: F,
    ) -> Result<(Colis, Colis), AppError>
    where
        F: FnOnce(&Colis) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock(&mut tx, id).await?;
        check(&current)?;

        let updated = sqlx::query_as::<_, Colis>(
            "UPDATE colis SET status_code = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status_code)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO colis_history (id, colis_id, status_code, comment, changed_by, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(status_code)
        .bind(comment)
        .bind(changed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((current, updated))
    }

    /// Asigna o retira el livreur validando contra la fila bloqueada
    pub async fn assign_livreur<F>(
        &self,
        id: Uuid,
        livreur_id: Option<Uuid>,
        check: F,
    ) -> Result<(Colis, Colis), AppError>
    where
        F: FnOnce(&Colis) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock(&mut tx, id).await?;
        check(&current)?;

        let updated = sqlx::query_as::<_, Colis>(
            "UPDATE colis SET livreur_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(livreur_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((current, updated))
    }

    /// Historial en orden cronológico
    pub async fn history(&self, colis_id: Uuid) -> Result<Vec<ColisHistory>, AppError> {
        let history = sqlx::query_as::<_, ColisHistory>(
            "SELECT * FROM colis_history WHERE colis_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(colis_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Conteo por código de estado dentro del alcance
    pub async fn count_by_status(&self, scope: ColisScope) -> Result<Vec<(String, i64)>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT status_code, COUNT(*) FROM colis WHERE TRUE");
        push_scope(&mut query, scope);
        query.push(" GROUP BY status_code");
        let counts = query.build_query_as::<(String, i64)>().fetch_all(&self.pool).await?;

        Ok(counts)
    }

    pub async fn recent(&self, scope: ColisScope, limit: i64) -> Result<Vec<Colis>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM colis WHERE TRUE");
        push_scope(&mut query, scope);
        query.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
        let colis = query.build_query_as::<Colis>().fetch_all(&self.pool).await?;

        Ok(colis)
    }

    /// Prefiltro de la búsqueda global, limitado al alcance
    pub async fn search(&self, term: &str, scope: ColisScope, limit: i64) -> Result<Vec<Colis>, AppError> {
        let pattern = like_pattern(term);
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM colis WHERE TRUE");
        push_scope(&mut query, scope);
        query
            .push(" AND (tracking_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR unaccent(recipient_name) ILIKE unaccent(")
            .push_bind(pattern.clone())
            .push(") OR recipient_phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR unaccent(delivery_city) ILIKE unaccent(")
            .push_bind(pattern)
            .push(")) ORDER BY created_at DESC LIMIT ")
            .push_bind(limit);
        let colis = query.build_query_as::<Colis>().fetch_all(&self.pool).await?;

        Ok(colis)
    }
}

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: ColisScope) {
    match scope {
        ColisScope::All => {}
        ColisScope::Entreprise(id) => {
            query.push(" AND entreprise_id = ").push_bind(id);
        }
        ColisScope::Livreur(id) => {
            query.push(" AND livreur_id = ").push_bind(id);
        }
        ColisScope::Nothing => {
            query.push(" AND FALSE");
        }
    }
}

fn push_colis_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ColisFilters) {
    if let Some(status) = filters.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query.push(" AND status_code = ").push_bind(status.to_string());
    }
    if let Some(client_id) = filters.client_id {
        query.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(entreprise_id) = filters.entreprise_id {
        query.push(" AND entreprise_id = ").push_bind(entreprise_id);
    }
    if let Some(livreur_id) = filters.livreur_id {
        query.push(" AND livreur_id = ").push_bind(livreur_id);
    }
    if let Some(bon_id) = filters.bon_id {
        query.push(" AND bon_id = ").push_bind(bon_id);
    }
    if let Some(date_from) = filters.date_from {
        query.push(" AND created_at::date >= ").push_bind(date_from);
    }
    if let Some(date_to) = filters.date_to {
        query.push(" AND created_at::date <= ").push_bind(date_to);
    }
    if let Some(term) = filters.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (tracking_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR recipient_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR recipient_phone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
