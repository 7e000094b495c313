//! Repositorios: acceso a PostgreSQL con SQLx
//!
//! Cada repositorio encapsula las queries de una tabla. Los filtros
//! dinámicos se construyen con `QueryBuilder`.

pub mod bon_repository;
pub mod client_repository;
pub mod colis_repository;
pub mod entreprise_repository;
pub mod livreur_repository;
pub mod notification_repository;
pub mod statut_repository;
pub mod user_repository;

/// Patrón `ILIKE` que contiene `term`, escapando comodines
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern(" dupont "), "%dupont%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
