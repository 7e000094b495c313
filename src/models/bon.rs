//! Modelo de Bon de distribution (hoja de ruta de un livreur)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ciclo de vida de un bon: ouvert → en_cours → cloture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonState {
    Ouvert,
    EnCours,
    Cloture,
}

impl BonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonState::Ouvert => "ouvert",
            BonState::EnCours => "en_cours",
            BonState::Cloture => "cloture",
        }
    }

    /// Transiciones permitidas del bon
    pub fn can_transition_to(&self, next: BonState) -> bool {
        matches!(
            (self, next),
            (BonState::Ouvert, BonState::EnCours)
                | (BonState::Ouvert, BonState::Cloture)
                | (BonState::EnCours, BonState::Cloture)
        )
    }

    pub fn is_closed(&self) -> bool {
        *self == BonState::Cloture
    }
}

impl fmt::Display for BonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ouvert" => Ok(BonState::Ouvert),
            "en_cours" => Ok(BonState::EnCours),
            "cloture" => Ok(BonState::Cloture),
            other => Err(format!("unknown bon state '{}'", other)),
        }
    }
}

/// Bon - mapea exactamente a la tabla bons
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bon {
    pub id: Uuid,
    pub number: String,
    pub livreur_id: Uuid,
    pub delivery_date: NaiveDate,
    pub state: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bon {
    /// Estado tipado; la columna tiene un CHECK con los tres valores
    pub fn state(&self) -> BonState {
        self.state.parse().unwrap_or(BonState::Cloture)
    }
}

/// Bon con el número de colis adjuntos (listados)
#[derive(Debug, Clone, FromRow)]
pub struct BonWithCount {
    #[sqlx(flatten)]
    pub bon: Bon,
    pub colis_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        assert!(BonState::Ouvert.can_transition_to(BonState::EnCours));
        assert!(BonState::Ouvert.can_transition_to(BonState::Cloture));
        assert!(BonState::EnCours.can_transition_to(BonState::Cloture));
        assert!(!BonState::EnCours.can_transition_to(BonState::Ouvert));
        assert!(!BonState::Cloture.can_transition_to(BonState::EnCours));
        assert!(!BonState::Cloture.can_transition_to(BonState::Cloture));
    }

    #[test]
    fn state_parses_from_column_text() {
        assert_eq!("en_cours".parse::<BonState>().unwrap(), BonState::EnCours);
        assert!("ferme".parse::<BonState>().is_err());
    }
}
