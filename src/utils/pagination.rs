//! Paginación de listados
//!
//! Normaliza `page` / `per_page` de la query y construye los metadatos
//! devueltos junto a cada página.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Parámetros de paginación recibidos en la query
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginación normalizada (página 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Self {
            page: query.page.filter(|p| *p > 0).unwrap_or(1),
            per_page: query
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }
}

/// Metadatos de una página
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub pages: i64,
    pub current_page: u32,
    pub per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(total: i64, pagination: Pagination) -> Self {
        let per_page = pagination.per_page as i64;
        let pages = if total <= 0 { 0 } else { (total + per_page - 1) / per_page };
        let current = pagination.page as i64;

        Self {
            total,
            pages,
            current_page: pagination.page,
            per_page: pagination.per_page,
            has_next: current < pages,
            has_prev: current > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let p = Pagination::from(PaginationQuery::default());
        assert_eq!(p, Pagination { page: 1, per_page: 10 });

        let p = Pagination::from(PaginationQuery { page: Some(0), per_page: Some(0) });
        assert_eq!(p, Pagination { page: 1, per_page: 1 });

        let p = Pagination::from(PaginationQuery { page: Some(3), per_page: Some(1000) });
        assert_eq!(p.per_page, 100);
        assert_eq!(p.offset(), 200);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn test_page_meta() {
        let meta = PageMeta::new(25, Pagination { page: 2, per_page: 10 });
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let last = PageMeta::new(25, Pagination { page: 3, per_page: 10 });
        assert!(!last.has_next);

        let empty = PageMeta::new(0, Pagination::default());
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
