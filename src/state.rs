//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::statut_repository::StatutRepository;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;
use crate::utils::pagination::{PageQuery, Pagination};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    statuses: Arc<RwLock<StatusCatalog>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self::with_catalog(pool, config, StatusCatalog::default())
    }

    pub fn with_catalog(pool: PgPool, config: EnvironmentConfig, catalog: StatusCatalog) -> Self {
        let jwt = JwtConfig::from(&config);
        Self {
            pool,
            config,
            jwt,
            statuses: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Copia del catálogo de estados actual
    pub async fn status_catalog(&self) -> StatusCatalog {
        self.statuses.read().await.clone()
    }

    /// Recargar el catálogo desde la base de datos
    pub async fn reload_statuses(&self) -> Result<usize, AppError> {
        let statuses = StatutRepository::new(self.pool.clone()).list_all().await?;
        let catalog = StatusCatalog::new(statuses);
        let count = catalog.len();

        *self.statuses.write().await = catalog;
        tracing::info!("🎨 Catálogo de estados cargado: {} estados", count);
        Ok(count)
    }

    /// Normalizar la paginación con los límites configurados
    pub fn pagination(&self, query: PageQuery) -> Pagination {
        Pagination::normalize(query, self.config.default_page_size, self.config.max_page_size)
    }
}
