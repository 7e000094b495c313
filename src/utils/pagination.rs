//! Paginación de listados
//!
//! Los listados se paginan en SQL (`LIMIT`/`OFFSET`); este módulo sólo
//! normaliza los parámetros y construye la respuesta.

use serde::{Deserialize, Serialize};

/// Parámetros de paginación recibidos en la query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginación normalizada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// page ≥ 1, per_page en `1..=max`, por defecto `default`
    pub fn normalize(query: PageQuery, default: u32, max: u32) -> Self {
        let max = max.max(1);
        Self {
            page: query.page.unwrap_or(1).max(1),
            per_page: query.per_page.unwrap_or(default).clamp(1, max),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// Respuesta paginada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let total = total.max(0);
        let per_page = i64::from(pagination.per_page);
        let total_pages = ((total + per_page - 1) / per_page) as u32;

        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = Pagination::normalize(PageQuery::default(), 20, 100);
        assert_eq!(p, Pagination { page: 1, per_page: 20 });

        let p = Pagination::normalize(PageQuery { page: Some(0), per_page: Some(500) }, 20, 100);
        assert_eq!(p, Pagination { page: 1, per_page: 100 });

        let p = Pagination::normalize(PageQuery { page: Some(3), per_page: Some(0) }, 20, 100);
        assert_eq!(p, Pagination { page: 3, per_page: 1 });
    }

    #[test]
    fn offset_follows_page() {
        let p = Pagination { page: 3, per_page: 25 };
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination { page: 1, per_page: 10 };
        assert_eq!(Paginated::new(vec![1; 10], 21, p).total_pages, 3);
        assert_eq!(Paginated::new(vec![1; 10], 20, p).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], 0, p).total_pages, 0);
    }

    #[test]
    fn map_keeps_metadata() {
        let p = Pagination { page: 2, per_page: 2 };
        let page = Paginated::new(vec![1, 2], 5, p).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
