//! Reparto de notificaciones
//!
//! Un cambio de estado avisa al personal interno, a los usuarios de la
//! entreprise del colis y al usuario de su livreur. Quien hace el cambio
//! nunca se notifica a sí mismo y cada destinatario recibe una sola fila.

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::colis::Colis;
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::user::{NotificationTarget, UserRole};
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::status_catalog::StatusCatalog;
use crate::utils::errors::AppError;

/// Destinatarios de un cambio de estado, sin duplicados y sin el autor
pub fn resolve_recipients(targets: &[NotificationTarget], colis: &Colis, actor: Uuid) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .filter(|target| {
            let staff = target
                .role
                .parse::<UserRole>()
                .map(|role| role.is_staff())
                .unwrap_or(false);
            let entreprise = colis.entreprise_id.is_some() && target.entreprise_id == colis.entreprise_id;
            let livreur = colis.livreur_id.is_some() && target.livreur_id == colis.livreur_id;
            staff || entreprise || livreur
        })
        .map(|target| target.id)
        .filter(|id| *id != actor && seen.insert(*id))
        .collect()
}

pub fn status_change_title(colis: &Colis) -> String {
    format!("Colis {}", colis.tracking_number)
}

pub fn status_change_message(from_label: &str, to_label: &str, comment: Option<&str>) -> String {
    let mut message = format!("Statut : {} → {}", from_label, to_label);
    if let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) {
        message.push_str(" (");
        message.push_str(comment);
        message.push(')');
    }
    message
}

pub struct NotificationService {
    users: UserRepository,
    notifications: NotificationRepository,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }

    /// Notificar un cambio de estado ya confirmado
    pub async fn notify_status_change(
        &self,
        colis: &Colis,
        from_code: &str,
        comment: Option<&str>,
        actor: Uuid,
        catalog: &StatusCatalog,
    ) -> Result<usize, AppError> {
        let targets = self
            .users
            .notification_targets(colis.entreprise_id, colis.livreur_id)
            .await?;
        let recipients = resolve_recipients(&targets, colis, actor);

        let title = status_change_title(colis);
        let message = status_change_message(
            catalog.label_for(from_code),
            catalog.label_for(&colis.status_code),
            comment,
        );
        let rows: Vec<NewNotification> = recipients
            .into_iter()
            .map(|user_id| NewNotification {
                user_id,
                title: title.clone(),
                message: message.clone(),
                kind: NotificationKind::StatusChange,
                colis_id: Some(colis.id),
            })
            .collect();

        let sent = self.notifications.insert_many(&rows).await?;
        tracing::debug!(colis_id = %colis.id, recipients = sent, "🔔 Cambio de estado notificado");
        Ok(sent)
    }

    /// Avisar al usuario del livreur recién asignado
    pub async fn notify_assignment(&self, colis: &Colis, livreur_id: Uuid, actor: Uuid) -> Result<usize, AppError> {
        let rows: Vec<NewNotification> = self
            .users
            .active_ids_for_livreur(livreur_id)
            .await?
            .into_iter()
            .filter(|id| *id != actor)
            .map(|user_id| NewNotification {
                user_id,
                title: format!("Colis {}", colis.tracking_number),
                message: format!(
                    "Nouveau colis assigné : {}, {}",
                    colis.recipient_name, colis.delivery_address
                ),
                kind: NotificationKind::Assignment,
                colis_id: Some(colis.id),
            })
            .collect();

        self.notifications.insert_many(&rows).await
    }

    /// Difusión a todos los usuarios activos o a un rol
    pub async fn broadcast(&self, title: &str, message: &str, role: Option<UserRole>) -> Result<usize, AppError> {
        let rows: Vec<NewNotification> = self
            .users
            .active_ids(role)
            .await?
            .into_iter()
            .map(|user_id| NewNotification {
                user_id,
                title: title.to_string(),
                message: message.to_string(),
                kind: NotificationKind::Broadcast,
                colis_id: None,
            })
            .collect();

        self.notifications.insert_many(&rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn colis(entreprise_id: Option<Uuid>, livreur_id: Option<Uuid>) -> Colis {
        Colis {
            id: Uuid::new_v4(),
            tracking_number: "COL-20250314-0A1B2C3D".to_string(),
            client_id: Uuid::new_v4(),
            entreprise_id,
            livreur_id,
            bon_id: None,
            status_code: "livre".to_string(),
            description: None,
            weight_kg: None,
            price: None,
            recipient_name: "Luc Besson".to_string(),
            recipient_phone: "0601020304".to_string(),
            delivery_address: "3 place Bellecour".to_string(),
            delivery_city: Some("Lyon".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn target(role: UserRole, entreprise_id: Option<Uuid>, livreur_id: Option<Uuid>) -> NotificationTarget {
        NotificationTarget {
            id: Uuid::new_v4(),
            role: role.as_str().to_string(),
            entreprise_id,
            livreur_id,
        }
    }

    #[test]
    fn staff_entreprise_and_livreur_users_are_notified() {
        let entreprise = Uuid::new_v4();
        let livreur = Uuid::new_v4();
        let admin = target(UserRole::Admin, None, None);
        let gestionnaire = target(UserRole::Gestionnaire, None, None);
        let entreprise_user = target(UserRole::Entreprise, Some(entreprise), None);
        let livreur_user = target(UserRole::Livreur, None, Some(livreur));
        let other_entreprise = target(UserRole::Entreprise, Some(Uuid::new_v4()), None);

        let targets = vec![
            admin.clone(),
            gestionnaire.clone(),
            entreprise_user.clone(),
            livreur_user.clone(),
            other_entreprise,
        ];
        let recipients = resolve_recipients(&targets, &colis(Some(entreprise), Some(livreur)), Uuid::new_v4());

        assert_eq!(
            recipients,
            vec![admin.id, gestionnaire.id, entreprise_user.id, livreur_user.id]
        );
    }

    #[test]
    fn actor_is_excluded_and_duplicates_collapse() {
        let livreur = Uuid::new_v4();
        let actor = target(UserRole::Livreur, None, Some(livreur));
        let admin = target(UserRole::Admin, None, None);

        let targets = vec![actor.clone(), admin.clone(), admin.clone()];
        let recipients = resolve_recipients(&targets, &colis(None, Some(livreur)), actor.id);

        assert_eq!(recipients, vec![admin.id]);
    }

    #[test]
    fn unlinked_colis_only_reaches_staff() {
        let targets = vec![
            target(UserRole::Entreprise, None, None),
            target(UserRole::Livreur, None, None),
        ];
        assert!(resolve_recipients(&targets, &colis(None, None), Uuid::new_v4()).is_empty());
    }

    #[test]
    fn message_carries_labels_and_optional_comment() {
        assert_eq!(
            status_change_message("En transit", "Livré", None),
            "Statut : En transit → Livré"
        );
        assert_eq!(
            status_change_message("En transit", "Échec", Some("  absent  ")),
            "Statut : En transit → Échec (absent)"
        );
        assert_eq!(
            status_change_message("En transit", "Livré", Some("   ")),
            "Statut : En transit → Livré"
        );
        assert_eq!(status_change_title(&colis(None, None)), "Colis COL-20250314-0A1B2C3D");
    }
}
