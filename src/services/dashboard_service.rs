//! Indicadores del dashboard

use sqlx::PgPool;
use std::collections::HashMap;

use crate::dto::colis_dto::ColisResponse;
use crate::dto::dashboard_dto::{DashboardStats, StatusCount};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::colis::ColisScope;
use crate::repositories::bon_repository::BonRepository;
use crate::repositories::client_repository::ClientRepository;
use crate::repositories::colis_repository::ColisRepository;
use crate::repositories::entreprise_repository::EntrepriseRepository;
use crate::repositories::livreur_repository::LivreurRepository;
use crate::repositories::notification_repository::NotificationRepository;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::AppError;

const RECENT_COLIS: i64 = 10;

/// Una entrada por estado del catálogo, aunque no tenga colis.
/// Códigos fuera del catálogo se añaden al final.
pub fn status_counts(catalog: &StatusCatalog, counts: Vec<(String, i64)>) -> Vec<StatusCount> {
    let mut by_code: HashMap<String, i64> = counts.into_iter().collect();

    let mut result: Vec<StatusCount> = catalog
        .statuses()
        .iter()
        .map(|statut| StatusCount {
            code: statut.code.clone(),
            label: statut.label.clone(),
            color: statut.color.clone(),
            count: by_code.remove(&statut.code).unwrap_or(0),
        })
        .collect();

    let mut unknown: Vec<(String, i64)> = by_code.into_iter().collect();
    unknown.sort();
    result.extend(unknown.into_iter().map(|(code, count)| StatusCount {
        label: catalog.label_for(&code).to_string(),
        color: catalog.color_for(&code).to_string(),
        code,
        count,
    }));

    result
}

pub struct DashboardService {
    colis: ColisRepository,
    clients: ClientRepository,
    entreprises: EntrepriseRepository,
    livreurs: LivreurRepository,
    bons: BonRepository,
    notifications: NotificationRepository,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            colis: ColisRepository::new(pool.clone()),
            clients: ClientRepository::new(pool.clone()),
            entreprises: EntrepriseRepository::new(pool.clone()),
            livreurs: LivreurRepository::new(pool.clone()),
            bons: BonRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }

    pub async fn stats(&self, user: &AuthenticatedUser, catalog: &StatusCatalog) -> Result<DashboardStats, AppError> {
        let scope = ColisScope::for_user(user);
        let staff = user.is_staff();

        let (counts, recent, unread) = futures::try_join!(
            self.colis.count_by_status(scope),
            self.colis.recent(scope, RECENT_COLIS),
            self.notifications.unread_count(user.user_id),
        )?;

        let (total_clients, total_entreprises, available_livreurs, open_bons) = if staff {
            futures::try_join!(
                self.clients.count(),
                self.entreprises.count(),
                self.livreurs.count_available(),
                self.bons.count_open(),
            )?
        } else {
            (0, 0, 0, 0)
        };

        let colis_by_status = status_counts(catalog, counts);
        let total_colis = colis_by_status.iter().map(|s| s.count).sum();

        Ok(DashboardStats {
            colis_by_status,
            total_colis,
            total_clients,
            total_entreprises,
            available_livreurs,
            open_bons,
            unread_notifications: unread,
            recent_colis: recent
                .into_iter()
                .map(|colis| ColisResponse::from_colis(colis, catalog))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::statut::Statut;
    use chrono::Utc;
    use uuid::Uuid;

    fn catalog() -> StatusCatalog {
        let statut = |code: &str, position: i32| Statut {
            id: Uuid::new_v4(),
            code: code.to_string(),
            label: code.to_uppercase(),
            color: "#123456".to_string(),
            position,
            is_final: false,
            created_at: Utc::now(),
        };
        StatusCatalog::new(vec![statut("en_attente", 10), statut("livre", 20)])
    }

    #[test]
    fn every_catalog_status_is_listed_even_at_zero() {
        let counts = status_counts(&catalog(), vec![("livre".to_string(), 4)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].code, "en_attente");
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 4);
        assert_eq!(counts[1].label, "LIVRE");
    }

    #[test]
    fn unknown_codes_are_appended_with_fallback_presentation() {
        let counts = status_counts(
            &catalog(),
            vec![("perdu".to_string(), 1), ("en_attente".to_string(), 2)],
        );
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[2].code, "perdu");
        assert_eq!(counts[2].label, "perdu");
        assert_eq!(counts[2].color, crate::services::status_catalog::FALLBACK_COLOR);
    }
}
