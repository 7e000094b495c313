use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::dto::bon_dto::BonFilters;
use crate::models::bon::{Bon, BonState, BonWithCount};
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::Pagination;

pub struct BonRepository {
    pool: PgPool,
}

impl BonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crea el bon y adjunta sus colis en una sola transacción
    pub async fn create_with_colis(&self, bon: &Bon, colis_ids: &[Uuid]) -> Result<Bon, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Bon>(
            r#"
            INSERT INTO bons (id, number, livreur_id, delivery_date, state, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(bon.id)
        .bind(&bon.number)
        .bind(bon.livreur_id)
        .bind(bon.delivery_date)
        .bind(&bon.state)
        .bind(&bon.notes)
        .bind(bon.created_at)
        .bind(bon.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        if !colis_ids.is_empty() {
            attach_in_tx(&mut tx, &created, colis_ids).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Bon>, AppError> {
        let bon = sqlx::query_as::<_, Bon>("SELECT * FROM bons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bon)
    }

    pub async fn list(
        &self,
        filters: &BonFilters,
        pagination: Pagination,
    ) -> Result<(Vec<BonWithCount>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT b.*, (SELECT COUNT(*) FROM colis c WHERE c.bon_id = b.id) AS colis_count FROM bons b WHERE TRUE",
        );
        push_bon_filters(&mut query, filters);
        query
            .push(" ORDER BY b.delivery_date DESC, b.created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let bons = query.build_query_as::<BonWithCount>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bons b WHERE TRUE");
        push_bon_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((bons, total))
    }

    pub async fn colis_count(&self, bon_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM colis WHERE bon_id = $1")
            .bind(bon_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_open(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bons WHERE state <> 'cloture'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Fila del bon bloqueada hasta el final de la transacción
    async fn lock(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Bon, AppError> {
        sqlx::query_as::<_, Bon>("SELECT * FROM bons WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| not_found_error("Bon", id))
    }

    /// Cambia el estado validando `check` contra la fila bloqueada
    pub async fn set_state<F>(&self, id: Uuid, state: BonState, check: F) -> Result<Bon, AppError>
    where
        F: FnOnce(&Bon) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock(&mut tx, id).await?;
        check(&current)?;

        let bon = sqlx::query_as::<_, Bon>(
            "UPDATE bons SET state = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(state.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(bon)
    }

    /// Adjunta colis a un bon existente; el bon queda bloqueado mientras tanto
    pub async fn attach<F>(&self, id: Uuid, colis_ids: &[Uuid], check: F) -> Result<(Bon, u64), AppError>
    where
        F: FnOnce(&Bon) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let bon = Self::lock(&mut tx, id).await?;
        check(&bon)?;
        let attached = attach_in_tx(&mut tx, &bon, colis_ids).await?;

        tx.commit().await?;
        Ok((bon, attached))
    }

    /// Retira un colis del bon; el livreur asignado se conserva
    pub async fn detach<F>(&self, id: Uuid, colis_id: Uuid, check: F) -> Result<bool, AppError>
    where
        F: FnOnce(&Bon) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let bon = Self::lock(&mut tx, id).await?;
        check(&bon)?;

        let result = sqlx::query("UPDATE colis SET bon_id = NULL, updated_at = NOW() WHERE id = $1 AND bon_id = $2")
            .bind(colis_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Elimina el bon liberando antes sus colis
    pub async fn delete<F>(&self, id: Uuid, check: F) -> Result<Bon, AppError>
    where
        F: FnOnce(&Bon) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let bon = Self::lock(&mut tx, id).await?;
        check(&bon)?;

        sqlx::query("UPDATE colis SET bon_id = NULL, updated_at = NOW() WHERE bon_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM bons WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bon)
    }
}

/// Comprueba existencia y disponibilidad de los colis y los adjunta al bon,
/// fijando también su livreur
async fn attach_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    bon: &Bon,
    colis_ids: &[Uuid],
) -> Result<u64, AppError> {
    let mut ids = colis_ids.to_vec();
    ids.sort();
    ids.dedup();

    // Bloquear los colis en orden fijo antes de comprobar a qué bon pertenecen
    let locked: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM colis WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;
    let found = locked.len() as i64;
    if found != ids.len() as i64 {
        return Err(AppError::NotFound(format!(
            "{} colis not found",
            ids.len() as i64 - found
        )));
    }

    let busy: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT c.tracking_number
        FROM colis c
        JOIN bons b ON b.id = c.bon_id
        WHERE c.id = ANY($1) AND b.id <> $2 AND b.state <> 'cloture'
        ORDER BY c.tracking_number
        "#,
    )
    .bind(&ids)
    .bind(bon.id)
    .fetch_all(&mut **tx)
    .await?;
    if !busy.is_empty() {
        return Err(AppError::Conflict(format!(
            "Colis already on another open bon: {}",
            busy.join(", ")
        )));
    }

    let result = sqlx::query(
        "UPDATE colis SET bon_id = $1, livreur_id = $2, updated_at = NOW() WHERE id = ANY($3)",
    )
    .bind(bon.id)
    .bind(bon.livreur_id)
    .bind(&ids)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

fn push_bon_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &BonFilters) {
    if let Some(livreur_id) = filters.livreur_id {
        query.push(" AND b.livreur_id = ").push_bind(livreur_id);
    }
    if let Some(state) = filters.state {
        query.push(" AND b.state = ").push_bind(state.as_str());
    }
    if let Some(date) = filters.date {
        query.push(" AND b.delivery_date = ").push_bind(date);
    }
}
