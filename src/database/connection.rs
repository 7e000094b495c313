//! Conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones de `./migrations` al arrancar.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::database::{mask_database_url, DatabaseConfig};

/// Crear el pool y aplicar migraciones pendientes
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("🗄️ Conectando a {}", mask_database_url(&config.url));

    let pool = config
        .create_pool()
        .await
        .context("could not connect to PostgreSQL")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("database migrations failed")?;

    tracing::info!("✅ Migraciones aplicadas");
    Ok(())
}
