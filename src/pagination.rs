//! Page and size handling.

use serde_json::{Map, Value as JsonValue};

/// Fallback page size when the caller supplies none (or garbage).
pub const DEFAULT_PER_PAGE: u64 = 50;

/// Validated pagination state: page is 1-based and at least 1, size is
/// positive. Invalid input coerces to the defaults instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: u64,
    per_page: u64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageSpec {
    #[must_use]
    pub fn new(page: i64, per_page: i64) -> Self {
        let mut spec = Self::default();
        spec.set_page(page);
        spec.set_per_page(per_page);
        spec
    }

    /// Read `page` and `size` (or `per_page`) from a raw parameter map.
    /// Values may be numbers or numeric strings.
    #[must_use]
    pub fn from_params(params: &Map<String, JsonValue>) -> Self {
        let page = int_param(params.get("page")).unwrap_or(1);
        let per_page = int_param(params.get("size").or_else(|| params.get("per_page")))
            .unwrap_or_else(|| i64::try_from(DEFAULT_PER_PAGE).unwrap_or(i64::MAX));
        Self::new(page, per_page)
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = u64::try_from(page).ok().filter(|p| *p > 0).unwrap_or(1);
    }

    pub fn set_per_page(&mut self, per_page: i64) {
        self.per_page = u64::try_from(per_page)
            .ok()
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PER_PAGE);
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Rows skipped before this page: `(page - 1) * per_page`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

fn int_param(value: Option<&JsonValue>) -> Option<i64> {
    match value? {
        JsonValue::Number(number) => number.as_i64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offset_and_limit() {
        let spec = PageSpec::new(3, 20);
        assert_eq!(spec.offset(), 40);
        assert_eq!(spec.limit(), 20);
    }

    #[test]
    fn test_first_page_has_zero_offset() {
        assert_eq!(PageSpec::new(1, 50).offset(), 0);
    }

    #[test]
    fn test_non_positive_input_coerces_to_defaults() {
        let spec = PageSpec::new(0, -5);
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.per_page(), DEFAULT_PER_PAGE);

        let spec = PageSpec::new(-2, 0);
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_from_params_accepts_numeric_strings() {
        let mut params = Map::new();
        params.insert("page".to_string(), json!("2"));
        params.insert("size".to_string(), json!("25"));
        let spec = PageSpec::from_params(&params);
        assert_eq!(spec.page(), 2);
        assert_eq!(spec.per_page(), 25);
    }

    #[test]
    fn test_from_params_falls_back_on_garbage() {
        let mut params = Map::new();
        params.insert("page".to_string(), json!("abc"));
        params.insert("size".to_string(), json!(true));
        let spec = PageSpec::from_params(&params);
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_per_page_falls_back_to_size_alias() {
        let mut params = Map::new();
        params.insert("per_page".to_string(), json!(10));
        let spec = PageSpec::from_params(&params);
        assert_eq!(spec.per_page(), 10);
    }

    #[test]
    fn test_size_wins_over_per_page() {
        let mut params = Map::new();
        params.insert("size".to_string(), json!(10));
        params.insert("per_page".to_string(), json!(99));
        let spec = PageSpec::from_params(&params);
        assert_eq!(spec.per_page(), 10);
    }
}
