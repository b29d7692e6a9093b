//! Search engine configuration

use serde::Deserialize;

/// Tunables for search execution and pagination.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size applied when the request does not specify one.
    pub default_page_size: usize,

    /// Hard cap on the number of rows a single request may ask for.
    pub max_page_size: usize,

    /// Result windows larger than this are split into bounded sub-scans.
    pub batch_threshold: usize,

    /// Rows fetched per sub-scan when batching applies.
    pub batch_size: usize,

    /// TTL for cached query results, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100_000,
            batch_threshold: 5_000,
            batch_size: 5_000,
            cache_ttl_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = SearchConfig::default();
        assert!(c.batch_size <= c.batch_threshold);
        assert!(c.default_page_size < c.max_page_size);
    }

    #[test]
    fn deserializes_with_partial_overrides() {
        let c: SearchConfig = serde_json::from_str(r#"{"batch_threshold": 1000}"#).unwrap();
        assert_eq!(c.batch_threshold, 1000);
        assert_eq!(c.default_page_size, 25);
    }
}
