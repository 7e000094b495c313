use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};

use crate::dto::search_dto::{SearchQuery, SearchResults};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::colis::ColisScope;
use crate::services::search_service::{clamp_limit, clean_query, SearchService};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::ApiQuery;

pub fn create_search_router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

/// Búsqueda global; los usuarios con alcance sólo ven sus colis
async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResults>, AppError> {
    let term = clean_query(query.q.as_deref())?;
    let limit = clamp_limit(query.limit);

    let catalog = state.status_catalog().await;
    let service = SearchService::new(state.pool.clone());
    let results = service
        .search(&term, limit, ColisScope::for_user(&user), &catalog)
        .await?;

    tracing::debug!(query = %term, total = results.total, "🔎 Búsqueda global");
    Ok(Json(results))
}
