use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Parámetros de búsqueda global
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

// Tipo de entidad encontrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Client,
    Entreprise,
    Livreur,
    Colis,
}

// Resultado individual de búsqueda
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub kind: SearchKind,
    pub id: Uuid,
    pub label: String,
    pub detail: Option<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// Resultados agrupados por entidad
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub clients: Vec<SearchHit>,
    pub entreprises: Vec<SearchHit>,
    pub livreurs: Vec<SearchHit>,
    pub colis: Vec<SearchHit>,
    pub total: usize,
}
