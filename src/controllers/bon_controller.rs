use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::bon_dto::{AttachColisRequest, BonDetailResponse, BonFilters, BonResponse, CreateBonRequest};
use crate::dto::colis_dto::ColisResponse;
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::bon::{Bon, BonState};
use crate::models::user::UserRole;
use crate::repositories::bon_repository::BonRepository;
use crate::repositories::colis_repository::ColisRepository;
use crate::repositories::livreur_repository::LivreurRepository;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::references::bon_number;
use crate::utils::validation::clean_filter;

/// Comprobar que el bon puede pasar a `next`
pub fn check_transition(bon: &Bon, next: BonState) -> Result<(), AppError> {
    let current = bon.state();
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Bon {} cannot move from '{}' to '{}'",
            bon.number, current, next
        )));
    }
    Ok(())
}

/// Los bons cerrados no admiten cambios en sus colis
pub fn ensure_editable(bon: &Bon) -> Result<(), AppError> {
    if bon.state().is_closed() {
        return Err(AppError::Conflict(format!("Bon {} is closed", bon.number)));
    }
    Ok(())
}

/// Sólo un bon abierto se puede eliminar
pub fn ensure_deletable(bon: &Bon) -> Result<(), AppError> {
    if bon.state() != BonState::Ouvert {
        return Err(AppError::Conflict(format!(
            "Bon {} can only be deleted while open",
            bon.number
        )));
    }
    Ok(())
}

/// Las cuentas entreprise no tienen acceso a los bons
pub fn ensure_bon_access(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.role == UserRole::Entreprise {
        return Err(forbidden_error("read bons", "entreprise accounts have no delivery manifests"));
    }
    Ok(())
}

pub struct BonController {
    repository: BonRepository,
    colis: ColisRepository,
    livreurs: LivreurRepository,
}

impl BonController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BonRepository::new(pool.clone()),
            colis: ColisRepository::new(pool.clone()),
            livreurs: LivreurRepository::new(pool),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Bon, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bon", id))
    }

    /// Un livreur sólo ve sus bons
    fn ensure_visible(user: &AuthenticatedUser, bon: &Bon) -> Result<(), AppError> {
        ensure_bon_access(user)?;
        match user.role {
            UserRole::Admin | UserRole::Gestionnaire => Ok(()),
            UserRole::Livreur if user.livreur_id == Some(bon.livreur_id) => Ok(()),
            _ => Err(not_found_error("Bon", bon.id)),
        }
    }

    pub async fn create(&self, request: CreateBonRequest) -> Result<ApiResponse<BonResponse>, AppError> {
        request.validate()?;

        if !self.livreurs.exists(request.livreur_id).await? {
            return Err(not_found_error("Livreur", request.livreur_id));
        }

        let now = Utc::now();
        let bon = Bon {
            id: Uuid::new_v4(),
            number: bon_number(request.delivery_date),
            livreur_id: request.livreur_id,
            delivery_date: request.delivery_date,
            state: BonState::Ouvert.as_str().to_string(),
            notes: clean_filter(request.notes.as_deref()),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create_with_colis(&bon, &request.colis_ids).await?;
        let count = self.repository.colis_count(created.id).await?;
        tracing::info!(bon_id = %created.id, number = %created.number, colis = count, "📋 Bon creado");

        Ok(ApiResponse::success_with_message(
            BonResponse::from_bon(created, count),
            "Bon creado exitosamente",
        ))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        mut filters: BonFilters,
        pagination: Pagination,
    ) -> Result<Paginated<BonResponse>, AppError> {
        ensure_bon_access(user)?;
        if user.role == UserRole::Livreur {
            match user.livreur_id {
                Some(livreur_id) => filters.livreur_id = Some(livreur_id),
                None => return Ok(Paginated::new(Vec::new(), 0, pagination)),
            }
        }

        let (bons, total) = self.repository.list(&filters, pagination).await?;
        Ok(Paginated::new(bons, total, pagination).map(|row| BonResponse::from_bon(row.bon, row.colis_count)))
    }

    pub async fn get_by_id(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        catalog: &StatusCatalog,
    ) -> Result<BonDetailResponse, AppError> {
        ensure_bon_access(user)?;
        let bon = self.find(id).await?;
        Self::ensure_visible(user, &bon)?;

        let colis: Vec<ColisResponse> = self
            .colis
            .find_by_bon(id)
            .await?
            .into_iter()
            .map(|colis| ColisResponse::from_colis(colis, catalog))
            .collect();

        Ok(BonDetailResponse {
            bon: BonResponse::from_bon(bon, colis.len() as i64),
            colis,
        })
    }

    pub async fn attach(&self, id: Uuid, request: AttachColisRequest) -> Result<ApiResponse<BonResponse>, AppError> {
        request.validate()?;

        let (bon, attached) = self.repository.attach(id, &request.colis_ids, ensure_editable).await?;
        let count = self.repository.colis_count(id).await?;
        tracing::info!(bon_id = %id, attached, "📎 Colis añadidos al bon");

        Ok(ApiResponse::success_with_message(
            BonResponse::from_bon(bon, count),
            format!("{} colis añadidos", attached),
        ))
    }

    pub async fn detach(&self, id: Uuid, colis_id: Uuid) -> Result<ApiResponse<()>, AppError> {
        if !self.repository.detach(id, colis_id, ensure_editable).await? {
            return Err(AppError::NotFound(format!("Colis '{}' is not on bon '{}'", colis_id, id)));
        }
        tracing::info!(bon_id = %id, colis_id = %colis_id, "📤 Colis retirado del bon");

        Ok(ApiResponse::message("Colis retirado del bon"))
    }

    async fn transition(&self, id: Uuid, next: BonState) -> Result<ApiResponse<BonResponse>, AppError> {
        let updated = self
            .repository
            .set_state(id, next, |bon| check_transition(bon, next))
            .await?;
        let count = self.repository.colis_count(id).await?;
        tracing::info!(bon_id = %id, state = %next, "🚚 Estado del bon actualizado");

        Ok(ApiResponse::success(BonResponse::from_bon(updated, count)))
    }

    pub async fn start(&self, id: Uuid) -> Result<ApiResponse<BonResponse>, AppError> {
        self.transition(id, BonState::EnCours).await
    }

    pub async fn close(&self, id: Uuid) -> Result<ApiResponse<BonResponse>, AppError> {
        self.transition(id, BonState::Cloture).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let bon = self.repository.delete(id, ensure_deletable).await?;
        tracing::info!(bon_id = %id, number = %bon.number, "🗑️ Bon eliminado");

        Ok(ApiResponse::message("Bon eliminado exitosamente"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bon(state: BonState) -> Bon {
        Bon {
            id: Uuid::new_v4(),
            number: "BON-20250601-A1B2C3".to_string(),
            livreur_id: Uuid::new_v4(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            state: state.as_str().to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn closed_bon_is_not_editable() {
        assert!(ensure_editable(&bon(BonState::Ouvert)).is_ok());
        assert!(ensure_editable(&bon(BonState::EnCours)).is_ok());
        assert!(matches!(ensure_editable(&bon(BonState::Cloture)), Err(AppError::Conflict(_))));
    }

    #[test]
    fn start_and_close_follow_lifecycle() {
        assert!(check_transition(&bon(BonState::Ouvert), BonState::EnCours).is_ok());
        assert!(check_transition(&bon(BonState::EnCours), BonState::Cloture).is_ok());
        assert!(matches!(
            check_transition(&bon(BonState::EnCours), BonState::EnCours),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            check_transition(&bon(BonState::Cloture), BonState::Cloture),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn livreur_only_sees_own_bon() {
        let b = bon(BonState::Ouvert);
        let own = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Livreur,
            entreprise_id: None,
            livreur_id: Some(b.livreur_id),
        };
        let other = AuthenticatedUser {
            livreur_id: Some(Uuid::new_v4()),
            ..own.clone()
        };
        assert!(BonController::ensure_visible(&own, &b).is_ok());
        assert!(matches!(BonController::ensure_visible(&other, &b), Err(AppError::NotFound(_))));
    }

    #[test]
    fn entreprise_is_forbidden_on_every_bon() {
        let b = bon(BonState::Ouvert);
        let entreprise = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Entreprise,
            entreprise_id: Some(Uuid::new_v4()),
            livreur_id: None,
        };
        assert!(matches!(ensure_bon_access(&entreprise), Err(AppError::Forbidden(_))));
        assert!(matches!(BonController::ensure_visible(&entreprise, &b), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn only_open_bons_are_deletable() {
        assert!(ensure_deletable(&bon(BonState::Ouvert)).is_ok());
        assert!(matches!(ensure_deletable(&bon(BonState::EnCours)), Err(AppError::Conflict(_))));
        assert!(matches!(ensure_deletable(&bon(BonState::Cloture)), Err(AppError::Conflict(_))));
    }
}
