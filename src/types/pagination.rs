//! Page-number pagination for dashboard tables.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::DEFAULT_PAGE_NUMBER;

/// `?query=&page=` parameters of searchable tables
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive search term
    #[serde(default)]
    pub query: String,
    /// 1-based page number
    #[serde(default)]
    pub page: Option<u64>,
}

impl SearchParams {
    /// Page number, never below the first page.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGE_NUMBER).max(DEFAULT_PAGE_NUMBER)
    }

    /// Trimmed search term
    pub fn query(&self) -> &str {
        self.query.trim()
    }
}

/// Row offset of a 1-based page, capped at what Postgres accepts for
/// `OFFSET`.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(MAX_SQL_OFFSET)
}

const MAX_SQL_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_first() {
        let params = SearchParams::default();
        assert_eq!(params.page(), 1);

        let params = SearchParams {
            query: String::new(),
            page: Some(0),
        };
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_offsets_and_totals() {
        assert_eq!(page_offset(1, 6), 0);
        assert_eq!(page_offset(3, 6), 12);
        assert_eq!(total_pages(0, 6), 0);
        assert_eq!(total_pages(6, 6), 1);
        assert_eq!(total_pages(13, 6), 3);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        assert_eq!(page_offset(u64::MAX, 6), i64::MAX.unsigned_abs());
        assert!(i64::try_from(page_offset(u64::MAX / 2, 6)).is_ok());

        let params: SearchParams =
            serde_json::from_value(serde_json::json!({ "page": u64::MAX })).unwrap();
        assert_eq!(params.page(), u64::MAX);
    }
}
