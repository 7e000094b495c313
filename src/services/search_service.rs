//! Búsqueda global
//!
//! Las cuatro entidades se consultan en paralelo con un prefiltro `ILIKE`
//! y los candidatos se puntúan en memoria sobre el texto normalizado.

use sqlx::PgPool;

use crate::dto::search_dto::{SearchHit, SearchKind, SearchResults};
use crate::models::colis::ColisScope;
use crate::repositories::client_repository::ClientRepository;
use crate::repositories::colis_repository::ColisRepository;
use crate::repositories::entreprise_repository::EntrepriseRepository;
use crate::repositories::livreur_repository::LivreurRepository;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::AppError;
use crate::utils::text::normalize;

pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 20;
/// Candidatos pedidos a la base por cada resultado devuelto
const OVERFETCH_FACTOR: i64 = 4;

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_PREFIX: u32 = 60;
pub const SCORE_WORD_PREFIX: u32 = 40;
pub const SCORE_CONTAINS: u32 = 20;

/// Término recortado; al menos dos caracteres
pub fn clean_query(raw: Option<&str>) -> Result<String, AppError> {
    let query = raw.map(str::trim).unwrap_or_default();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "La búsqueda necesita al menos {} caracteres",
            MIN_QUERY_CHARS
        )));
    }
    Ok(query.to_string())
}

pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Puntuación de un campo frente a la consulta, ambos ya normalizados
pub fn score_field(query: &str, field: &str) -> u32 {
    if query.is_empty() || field.is_empty() {
        return 0;
    }
    if field == query {
        SCORE_EXACT
    } else if field.starts_with(query) {
        SCORE_PREFIX
    } else if field
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| !word.is_empty() && word.starts_with(query))
    {
        SCORE_WORD_PREFIX
    } else if field.contains(query) {
        SCORE_CONTAINS
    } else {
        0
    }
}

/// Mejor puntuación entre los campos de una entidad
pub fn best_score<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> u32 {
    fields
        .into_iter()
        .map(|field| score_field(query, &normalize(field)))
        .max()
        .unwrap_or(0)
}

/// Descarta los que no puntúan, ordena por puntuación y luego etiqueta
pub fn rank(mut hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.retain(|hit| hit.score > 0);
    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| normalize(&a.label).cmp(&normalize(&b.label)))
            .then_with(|| a.label.cmp(&b.label))
    });
    hits.truncate(limit);
    hits
}

pub struct SearchService {
    clients: ClientRepository,
    entreprises: EntrepriseRepository,
    livreurs: LivreurRepository,
    colis: ColisRepository,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            entreprises: EntrepriseRepository::new(pool.clone()),
            livreurs: LivreurRepository::new(pool.clone()),
            colis: ColisRepository::new(pool),
        }
    }

    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        scope: ColisScope,
        catalog: &StatusCatalog,
    ) -> Result<SearchResults, AppError> {
        let fetch = i64::from(limit) * OVERFETCH_FACTOR;
        let directory = scope == ColisScope::All;
        let needle = normalize(query);

        let (clients, entreprises, livreurs, colis) = futures::try_join!(
            async {
                if directory {
                    self.clients.search(query, fetch).await
                } else {
                    Ok(Vec::new())
                }
            },
            async {
                if directory {
                    self.entreprises.search(query, fetch).await
                } else {
                    Ok(Vec::new())
                }
            },
            async {
                if directory {
                    self.livreurs.search(query, fetch).await
                } else {
                    Ok(Vec::new())
                }
            },
            self.colis.search(query, scope, fetch),
        )?;

        let limit = limit as usize;

        let clients = rank(
            clients
                .into_iter()
                .map(|client| {
                    let score = best_score(
                        &needle,
                        [
                            client.full_name().as_str(),
                            client.first_name.as_str(),
                            client.last_name.as_str(),
                            client.phone.as_str(),
                            client.email.as_deref().unwrap_or_default(),
                        ],
                    );
                    SearchHit {
                        kind: SearchKind::Client,
                        id: client.id,
                        score,
                        label: client.full_name(),
                        detail: Some(client.phone),
                        color: None,
                    }
                })
                .collect(),
            limit,
        );

        let entreprises = rank(
            entreprises
                .into_iter()
                .map(|entreprise| {
                    let score = best_score(
                        &needle,
                        [
                            entreprise.name.as_str(),
                            entreprise.email.as_deref().unwrap_or_default(),
                            entreprise.siret.as_deref().unwrap_or_default(),
                            entreprise.city.as_deref().unwrap_or_default(),
                        ],
                    );
                    SearchHit {
                        kind: SearchKind::Entreprise,
                        id: entreprise.id,
                        score,
                        label: entreprise.name,
                        detail: entreprise.city,
                        color: None,
                    }
                })
                .collect(),
            limit,
        );

        let livreurs = rank(
            livreurs
                .into_iter()
                .map(|livreur| {
                    let score = best_score(
                        &needle,
                        [
                            livreur.full_name().as_str(),
                            livreur.first_name.as_str(),
                            livreur.last_name.as_str(),
                            livreur.phone.as_str(),
                            livreur.zone.as_deref().unwrap_or_default(),
                        ],
                    );
                    SearchHit {
                        kind: SearchKind::Livreur,
                        id: livreur.id,
                        score,
                        label: livreur.full_name(),
                        detail: livreur.zone,
                        color: None,
                    }
                })
                .collect(),
            limit,
        );

        let colis = rank(
            colis
                .into_iter()
                .map(|colis| {
                    let score = best_score(
                        &needle,
                        [
                            colis.tracking_number.as_str(),
                            colis.recipient_name.as_str(),
                            colis.recipient_phone.as_str(),
                            colis.delivery_city.as_deref().unwrap_or_default(),
                        ],
                    );
                    SearchHit {
                        kind: SearchKind::Colis,
                        id: colis.id,
                        score,
                        detail: Some(format!(
                            "{} · {}",
                            colis.recipient_name,
                            catalog.label_for(&colis.status_code)
                        )),
                        color: Some(catalog.color_for(&colis.status_code).to_string()),
                        label: colis.tracking_number,
                    }
                })
                .collect(),
            limit,
        );

        let total = clients.len() + entreprises.len() + livreurs.len() + colis.len();
        Ok(SearchResults {
            query: query.to_string(),
            clients,
            entreprises,
            livreurs,
            colis,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn hit(label: &str, score: u32) -> SearchHit {
        SearchHit {
            kind: SearchKind::Client,
            id: Uuid::new_v4(),
            label: label.to_string(),
            detail: None,
            score,
            color: None,
        }
    }

    #[test]
    fn query_needs_two_characters() {
        assert!(matches!(clean_query(None), Err(AppError::BadRequest(_))));
        assert!(matches!(clean_query(Some("  a ")), Err(AppError::BadRequest(_))));
        assert_eq!(clean_query(Some(" du ")).unwrap(), "du");
        assert_eq!(clean_query(Some("é1")).unwrap(), "é1");
    }

    #[test]
    fn limit_defaults_and_is_capped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(8)), 8);
    }

    #[test]
    fn field_scores_follow_match_quality() {
        assert_eq!(score_field("dupont", "dupont"), SCORE_EXACT);
        assert_eq!(score_field("dup", "dupont"), SCORE_PREFIX);
        assert_eq!(score_field("dup", "jean dupont"), SCORE_WORD_PREFIX);
        assert_eq!(score_field("dup", "marie-dupuis"), SCORE_WORD_PREFIX);
        assert_eq!(score_field("pon", "jean dupont"), SCORE_CONTAINS);
        assert_eq!(score_field("xyz", "jean dupont"), 0);
        assert_eq!(score_field("", "jean"), 0);
    }

    #[test]
    fn best_score_normalises_accents_and_case() {
        assert_eq!(best_score("helene", ["Hélène", "0612345678"]), SCORE_EXACT);
        assert_eq!(best_score("06", ["Hélène", "0612345678"]), SCORE_PREFIX);
        assert_eq!(best_score("zz", ["Hélène", ""]), 0);
    }

    #[test]
    fn ranking_orders_by_score_then_label_and_truncates() {
        let ranked = rank(
            vec![
                hit("Zoé Martin", 40),
                hit("Alice Martin", 40),
                hit("Martin", 100),
                hit("Sans rapport", 0),
                hit("Émile Martin", 40),
            ],
            3,
        );
        let labels: Vec<&str> = ranked.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Martin", "Alice Martin", "Émile Martin"]);
    }
}
