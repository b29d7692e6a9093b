//! Text normalization helpers for order-insensitive and domain matching.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Lowercased whitespace tokens of a phrase.
pub fn word_tokens(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Word-order-insensitive normal form: lowercase, split on whitespace, sort
/// the tokens, rejoin with single spaces. "Manager of Engineering" and
/// "of Engineering Manager" normalize identically.
pub fn sort_words(input: &str) -> String {
    let mut tokens = word_tokens(input);
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Reduce a URL to its registrable domain: strip scheme, a leading `www.`
/// prefix, port and path, and lowercase the rest.
pub fn registrable_domain(input: &str) -> String {
    let trimmed = input.trim().to_lowercase();
    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed.as_str(),
    };
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Bounded memoization cache for word-sorted normalization. Injected where
/// needed instead of living as module-global state; titles repeat heavily
/// across requests, so compile-time normalization benefits from reuse.
pub struct NormalizerCache {
    cache: Mutex<LruCache<String, String>>,
}

impl NormalizerCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("max(1) is non-zero");
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Word-sorted normal form, memoized with LRU eviction.
    pub fn sorted(&self, input: &str) -> String {
        let mut cache = self.cache.lock().unwrap();
        if let Some(hit) = cache.get(input) {
            return hit.clone();
        }
        let normalized = sort_words(input);
        cache.put(input.to_string(), normalized.clone());
        normalized
    }
}

impl Default for NormalizerCache {
    fn default() -> Self {
        Self::new(4096)
    }
}
