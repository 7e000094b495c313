//! Catálogo de estados de colis
//!
//! Snapshot en memoria de la tabla `statuts`, ordenado por `position`.
//! Da color y etiqueta a cada código y decide qué transiciones son válidas.
//! Se recarga tras cada modificación del catálogo.

use serde::Serialize;

use crate::models::statut::Statut;
use crate::utils::errors::AppError;

/// Color neutro para códigos desconocidos
pub const FALLBACK_COLOR: &str = "#9ca3af";

/// Código inicial si el catálogo estuviera vacío
pub const DEFAULT_INITIAL_CODE: &str = "en_attente";

/// Entrada pública de la leyenda de colores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub code: String,
    pub label: String,
    pub color: String,
    pub is_final: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    statuses: Vec<Statut>,
}

impl StatusCatalog {
    pub fn new(mut statuses: Vec<Statut>) -> Self {
        statuses.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
        Self { statuses }
    }

    pub fn statuses(&self) -> &[Statut] {
        &self.statuses
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Statut> {
        self.statuses.iter().find(|s| s.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn color_for(&self, code: &str) -> &str {
        self.get(code).map(|s| s.color.as_str()).unwrap_or(FALLBACK_COLOR)
    }

    pub fn label_for<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(|s| s.label.as_str()).unwrap_or(code)
    }

    pub fn is_final(&self, code: &str) -> bool {
        self.get(code).map(|s| s.is_final).unwrap_or(false)
    }

    /// Estado asignado a un colis recién creado
    pub fn initial(&self) -> &str {
        self.statuses
            .first()
            .map(|s| s.code.as_str())
            .unwrap_or(DEFAULT_INITIAL_CODE)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.statuses
            .iter()
            .map(|s| LegendEntry {
                code: s.code.clone(),
                label: s.label.clone(),
                color: s.color.clone(),
                is_final: s.is_final,
            })
            .collect()
    }

    /// Validar un cambio de estado `from → to`
    ///
    /// Salir de un estado final sólo lo puede hacer un admin.
    pub fn validate_transition(&self, from: &str, to: &str, is_admin: bool) -> Result<(), AppError> {
        if !self.contains(to) {
            return Err(AppError::BadRequest(format!("Estado desconocido '{}'", to)));
        }
        if from == to {
            return Err(AppError::Conflict(format!("El colis ya está en estado '{}'", to)));
        }
        if self.is_final(from) && !is_admin {
            return Err(AppError::Forbidden(format!(
                "El estado '{}' es final; sólo un administrador puede modificarlo",
                self.label_for(from)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn statut(code: &str, position: i32, is_final: bool) -> Statut {
        Statut {
            id: Uuid::new_v4(),
            code: code.to_string(),
            label: code.replace('_', " "),
            color: format!("#00000{}", position % 10),
            position,
            is_final,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> StatusCatalog {
        StatusCatalog::new(vec![
            statut("livre", 50, true),
            statut("en_transit", 30, false),
            statut("en_attente", 10, false),
            statut("annule", 80, true),
        ])
    }

    #[test]
    fn orders_by_position_and_picks_initial() {
        let catalog = catalog();
        let codes: Vec<&str> = catalog.statuses().iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["en_attente", "en_transit", "livre", "annule"]);
        assert_eq!(catalog.initial(), "en_attente");
    }

    #[test]
    fn empty_catalog_falls_back_to_default_initial() {
        assert_eq!(StatusCatalog::default().initial(), DEFAULT_INITIAL_CODE);
    }

    #[test]
    fn unknown_codes_get_neutral_color_and_raw_label() {
        let catalog = catalog();
        assert_eq!(catalog.color_for("livre"), "#000000");
        assert_eq!(catalog.color_for("perdu"), FALLBACK_COLOR);
        assert_eq!(catalog.label_for("perdu"), "perdu");
        assert_eq!(catalog.label_for("en_transit"), "en transit");
    }

    #[test]
    fn transitions_to_unknown_or_same_status_are_rejected() {
        let catalog = catalog();
        assert!(matches!(
            catalog.validate_transition("en_attente", "perdu", true),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            catalog.validate_transition("en_transit", "en_transit", true),
            Err(AppError::Conflict(_))
        ));
        assert!(catalog.validate_transition("en_attente", "en_transit", false).is_ok());
    }

    #[test]
    fn leaving_final_status_requires_admin() {
        let catalog = catalog();
        assert!(matches!(
            catalog.validate_transition("livre", "en_transit", false),
            Err(AppError::Forbidden(_))
        ));
        assert!(catalog.validate_transition("livre", "en_transit", true).is_ok());
    }

    #[test]
    fn legend_mirrors_catalog_order() {
        let legend = catalog().legend();
        assert_eq!(legend.len(), 4);
        assert_eq!(legend[0].code, "en_attente");
        assert!(legend[2].is_final);
    }
}
