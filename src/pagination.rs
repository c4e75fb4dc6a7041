//! Lenient `page` / `limit` handling for list endpoints.
//!
//! Query strings arrive as text. Anything that is not a positive integer falls back to
//! the default instead of failing the request, and `limit` is capped.

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Sanitized paging parameters ready to be bound as `LIMIT` / `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn sanitize(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit)
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::sanitize(None, None)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_absent() {
        assert_eq!(
            PageParams::sanitize(None, None),
            PageParams {
                page: 1,
                limit: 10,
                offset: 0
            }
        );
    }

    #[test]
    fn test_offset_follows_page() {
        let params = PageParams::sanitize(Some("3"), Some("5"));
        assert_eq!(params.offset, 10);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = PageParams::sanitize(Some("abc"), Some("-4"));
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);

        let params = PageParams::sanitize(Some("0"), Some("1.5"));
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(PageParams::sanitize(None, Some("500")).limit, MAX_LIMIT);
    }
}
