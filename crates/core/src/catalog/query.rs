use serde::Deserialize;

use crate::errors::CatalogError;
use crate::store::DocumentFilter;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 200;

/// Raw list parameters as they arrive from a query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub limit: Option<String>,
}

/// Validated list request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self { search: None, category: None, platform: None, limit: DEFAULT_LIMIT }
    }
}

impl ProductQuery {
    pub fn new(
        search: Option<String>,
        category: Option<String>,
        platform: Option<String>,
        limit: i64,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            search: non_empty(search),
            category: non_empty(category),
            platform: non_empty(platform),
            limit: validate_limit(limit)?,
        })
    }

    pub fn from_params(params: ListParams) -> Result<Self, CatalogError> {
        let limit = match params.limit.as_deref().map(str::trim) {
            None | Some("") => i64::from(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| CatalogError::invalid("limit", "must be an integer"))?,
        };
        Self::new(params.q, params.category, params.platform, limit)
    }

    pub fn to_filter(&self) -> DocumentFilter {
        let mut filter = DocumentFilter::new();
        if let Some(search) = &self.search {
            filter = filter.contains_ignore_case("title", search.clone());
        }
        if let Some(category) = &self.category {
            filter = filter.equals("category", category.clone());
        }
        if let Some(platform) = &self.platform {
            filter = filter.equals("platform", platform.clone());
        }
        filter
    }
}

pub fn validate_limit(limit: i64) -> Result<u32, CatalogError> {
    if (i64::from(MIN_LIMIT)..=i64::from(MAX_LIMIT)).contains(&limit) {
        u32::try_from(limit).map_err(|_| CatalogError::invalid("limit", "out of range"))
    } else {
        Err(CatalogError::invalid("limit", format!("must be between {MIN_LIMIT} and {MAX_LIMIT}")))
    }
}

// Empty strings count as absent; values are otherwise passed through untouched.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
