//! Modelo de Colis
//!
//! Un colis pertenece a un client, opcionalmente a una entreprise, y puede
//! estar asignado a un livreur y a un bon de distribution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::middleware::auth::AuthenticatedUser;

/// Colis - mapea exactamente a la tabla colis
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Colis {
    pub id: Uuid,
    pub tracking_number: String,
    pub client_id: Uuid,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub bon_id: Option<Uuid>,
    pub status_code: String,
    pub description: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub price: Option<Decimal>,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub delivery_address: String,
    pub delivery_city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entrada del historial de estados de un colis
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ColisHistory {
    pub id: Uuid,
    pub colis_id: Uuid,
    pub status_code: String,
    pub comment: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Alcance de visibilidad de colis según el rol del usuario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColisScope {
    All,
    Entreprise(Uuid),
    Livreur(Uuid),
    /// Usuario de rol restringido sin vínculo: no ve nada
    Nothing,
}

impl ColisScope {
    pub fn for_user(user: &AuthenticatedUser) -> Self {
        match user.role {
            UserRole::Admin | UserRole::Gestionnaire => ColisScope::All,
            UserRole::Entreprise => user
                .entreprise_id
                .map(ColisScope::Entreprise)
                .unwrap_or(ColisScope::Nothing),
            UserRole::Livreur => user
                .livreur_id
                .map(ColisScope::Livreur)
                .unwrap_or(ColisScope::Nothing),
        }
    }

    /// ¿Es visible este colis dentro del alcance?
    pub fn allows(&self, colis: &Colis) -> bool {
        match self {
            ColisScope::All => true,
            ColisScope::Entreprise(id) => colis.entreprise_id == Some(*id),
            ColisScope::Livreur(id) => colis.livreur_id == Some(*id),
            ColisScope::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colis(entreprise_id: Option<Uuid>, livreur_id: Option<Uuid>) -> Colis {
        Colis {
            id: Uuid::new_v4(),
            tracking_number: "COL-20250101-ABCDEF12".to_string(),
            client_id: Uuid::new_v4(),
            entreprise_id,
            livreur_id,
            bon_id: None,
            status_code: "en_attente".to_string(),
            description: None,
            weight_kg: None,
            price: None,
            recipient_name: "Marie Curie".to_string(),
            recipient_phone: "0612345678".to_string(),
            delivery_address: "1 rue de la Paix".to_string(),
            delivery_city: Some("Paris".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(role: UserRole, entreprise_id: Option<Uuid>, livreur_id: Option<Uuid>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role,
            entreprise_id,
            livreur_id,
        }
    }

    #[test]
    fn staff_sees_everything() {
        let scope = ColisScope::for_user(&user(UserRole::Gestionnaire, None, None));
        assert_eq!(scope, ColisScope::All);
        assert!(scope.allows(&colis(None, None)));
    }

    #[test]
    fn entreprise_user_only_sees_its_colis() {
        let entreprise = Uuid::new_v4();
        let scope = ColisScope::for_user(&user(UserRole::Entreprise, Some(entreprise), None));
        assert!(scope.allows(&colis(Some(entreprise), None)));
        assert!(!scope.allows(&colis(Some(Uuid::new_v4()), None)));
        assert!(!scope.allows(&colis(None, None)));
    }

    #[test]
    fn livreur_user_only_sees_assigned_colis() {
        let livreur = Uuid::new_v4();
        let scope = ColisScope::for_user(&user(UserRole::Livreur, None, Some(livreur)));
        assert!(scope.allows(&colis(None, Some(livreur))));
        assert!(!scope.allows(&colis(None, None)));
    }

    #[test]
    fn unlinked_restricted_user_sees_nothing() {
        let scope = ColisScope::for_user(&user(UserRole::Entreprise, None, None));
        assert_eq!(scope, ColisScope::Nothing);
        assert!(!scope.allows(&colis(None, None)));
    }
}
