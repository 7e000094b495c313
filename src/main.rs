use anyhow::Result;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use colis_backoffice::config::{DatabaseConfig, EnvironmentConfig};
use colis_backoffice::services::auth_service::bootstrap_admin;
use colis_backoffice::{create_app, database, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenvy::dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    info!("📦 Colis Back-office API");
    info!("=======================");

    let config = EnvironmentConfig::from_env()?;
    if config.is_development() {
        info!("🛠️ Modo desarrollo: revisa JWT_SECRET antes de desplegar");
    }
    let db_config = DatabaseConfig::from_env()?;

    // Inicializar base de datos
    let pool = match database::connect(&db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(e);
        }
    };

    if let Some(admin_id) = bootstrap_admin(&pool, &config)
        .await
        .map_err(|e| anyhow::anyhow!("Error creando el administrador inicial: {}", e))?
    {
        info!("👤 Administrador inicial: {}", admin_id);
    }

    let state = AppState::new(pool, config.clone());
    state
        .reload_statuses()
        .await
        .map_err(|e| anyhow::anyhow!("Error cargando el catálogo de estados: {}", e))?;

    let app = create_app(state);

    let addr = config.server_url();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Servidor iniciando en http://{} ({})", addr, config.environment);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
