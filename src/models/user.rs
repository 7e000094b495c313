//! Modelo de User
//!
//! Usuarios del back-office. El rol se guarda como texto en la tabla
//! `users` y se convierte a `UserRole` en los bordes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Roles disponibles en el back-office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Gestionnaire,
    Entreprise,
    Livreur,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Gestionnaire => "gestionnaire",
            UserRole::Entreprise => "entreprise",
            UserRole::Livreur => "livreur",
        }
    }

    /// Personal interno: ve y modifica todo lo operativo
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Gestionnaire)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "gestionnaire" => Ok(UserRole::Gestionnaire),
            "entreprise" => Ok(UserRole::Entreprise),
            "livreur" => Ok(UserRole::Livreur),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Rol tipado; un valor desconocido en base se trata como el menos privilegiado
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::Livreur)
    }
}

/// Destinatario potencial de una notificación
#[derive(Debug, Clone, FromRow)]
pub struct NotificationTarget {
    pub id: Uuid,
    pub role: String,
    pub entreprise_id: Option<Uuid>,
    pub livreur_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [UserRole::Admin, UserRole::Gestionnaire, UserRole::Entreprise, UserRole::Livreur] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superadmin".parse::<UserRole>().is_err());
    }

    #[test]
    fn only_admin_and_gestionnaire_are_staff() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Gestionnaire.is_staff());
        assert!(!UserRole::Entreprise.is_staff());
        assert!(!UserRole::Livreur.is_staff());
    }
}
