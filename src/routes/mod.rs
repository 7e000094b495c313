//! Rutas HTTP
//!
//! Cada módulo expone un `Router<AppState>`; `create_app` los monta bajo
//! `/api` y protege todo salvo login, leyenda, tracking y health.

pub mod auth_routes;
pub mod bon_routes;
pub mod client_routes;
pub mod colis_routes;
pub mod dashboard_routes;
pub mod entreprise_routes;
pub mod livreur_routes;
pub mod notification_routes;
pub mod search_routes;
pub mod statut_routes;
pub mod user_routes;

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::auth::require_auth;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Construir la aplicación completa
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/info", get(info))
        .route("/api/auth/login", post(auth_routes::login))
        .route("/api/statuts/legend", get(statut_routes::legend))
        .route("/api/tracking/:tracking_number", get(colis_routes::tracking));

    let protected = Router::new()
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/entreprises", entreprise_routes::create_entreprise_router())
        .nest("/api/clients", client_routes::create_client_router())
        .nest("/api/livreurs", livreur_routes::create_livreur_router())
        .nest("/api/statuts", statut_routes::create_statut_router())
        .nest("/api/colis", colis_routes::create_colis_router())
        .nest("/api/bons", bon_routes::create_bon_router())
        .nest("/api/notifications", notification_routes::create_notification_router())
        .nest("/api/search", search_routes::create_search_router())
        .nest("/api/dashboard", dashboard_routes::create_dashboard_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn info() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Back-office de gestión de colis, livreurs y bons de livraison",
        "routes": [
            "/api/auth",
            "/api/users",
            "/api/entreprises",
            "/api/clients",
            "/api/livreurs",
            "/api/statuts",
            "/api/colis",
            "/api/bons",
            "/api/notifications",
            "/api/search",
            "/api/dashboard",
            "/api/tracking/:tracking_number",
        ],
    }))
}
