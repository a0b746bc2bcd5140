use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
/// Keeps `offset()` far from `i64::MAX`.
pub const MAX_PAGE: i64 = 1_000_000;

/// `?page=&limit=` as sent by clients. Missing, non-numeric or non-positive
/// values fall back to the defaults; oversized ones are clamped.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

fn positive_or(value: i64, default: i64, max: i64) -> i64 {
    if value < 1 {
        default
    } else {
        value.min(max)
    }
}

impl Page {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE, MAX_PAGE),
            limit: positive_or(limit, DEFAULT_LIMIT, MAX_LIMIT),
        }
    }

    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl From<PageQuery> for Page {
    fn from(q: PageQuery) -> Self {
        let parse = |raw: Option<String>, default: i64| {
            raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(default)
        };
        Page::new(parse(q.page, DEFAULT_PAGE), parse(q.limit, DEFAULT_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: &str, limit: &str) -> PageQuery {
        PageQuery {
            page: Some(page.into()),
            limit: Some(limit.into()),
        }
    }

    #[test]
    fn non_positive_values_use_defaults() {
        assert_eq!(Page::from(query("0", "-3")), Page { page: 1, limit: 10 });
        assert_eq!(Page::from(PageQuery::default()).offset(), 0);
    }

    #[test]
    fn garbage_values_use_defaults() {
        assert_eq!(Page::from(query("abc", "")), Page { page: 1, limit: 10 });
        assert_eq!(Page::from(query("2", "1.5")), Page { page: 2, limit: 10 });
    }

    #[test]
    fn huge_values_are_clamped() {
        let page = Page::from(query("9223372036854775807", "9223372036854775807"));
        assert_eq!(page, Page { page: MAX_PAGE, limit: MAX_LIMIT });
        assert_eq!(page.offset(), (MAX_PAGE - 1) * MAX_LIMIT);
        assert!(Page::new(i64::MAX, i64::MAX).offset() > 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(Page::new(3, 5).offset(), 10);
    }
}
