//! Read cache with TTL and pattern invalidation
//!
//! Process-local key-value store memoizing serialized list/detail payloads.
//! The cache is advisory only: every entry carries a TTL, writers invalidate
//! by key or by `prefix:*` pattern, and correctness never depends on a hit.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache TTLs per payload family
pub const CATEGORY_LIST_TTL: Duration = Duration::from_secs(30);
pub const PRODUCT_LIST_TTL: Duration = Duration::from_secs(300);
pub const PRODUCT_DETAIL_TTL: Duration = Duration::from_secs(600);
pub const RELATED_PRODUCTS_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct CacheEntry {
    expires_at: Instant,
    payload: Value,
}

/// Shared TTL cache
#[derive(Debug, Clone, Default)]
pub struct CacheService {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl CacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload, or None when absent/expired
    pub fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.payload.clone())
    }

    pub fn set(&self, key: impl Into<String>, payload: Value, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                expires_at: Instant::now() + ttl,
                payload,
            },
        );
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Delete every key matching a trailing-wildcard pattern, e.g.
    /// `products:*`. A pattern without `*` behaves like [`delete`].
    pub fn delete_pattern(&self, pattern: &str) {
        match pattern.strip_suffix('*') {
            Some(prefix) => self
                .entries
                .retain(|key, _| !key.starts_with(prefix)),
            None => {
                self.entries.remove(pattern);
            }
        }
    }
}

/// Cache key builders shared by the catalog handlers
pub mod keys {
    pub fn category_list() -> String {
        "categories:list".to_string()
    }

    pub fn product_list(category: Option<&str>, search: Option<&str>, page: usize) -> String {
        format!(
            "products:list:cat={}:search={}:page={}",
            category.unwrap_or_default(),
            search.unwrap_or_default(),
            page
        )
    }

    pub fn product_detail(id: &str) -> String {
        format!("product:detail:{id}")
    }

    pub fn related_products(id: &str) -> String {
        format!("product:related:{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_stored_payload() {
        let cache = CacheService::new();
        cache.set("categories:list", json!([{"name": "Gowns"}]), Duration::from_secs(30));
        assert_eq!(
            cache.get("categories:list"),
            Some(json!([{"name": "Gowns"}]))
        );
    }

    #[test]
    fn expired_entries_miss() {
        let cache = CacheService::new();
        cache.set("k", json!(1), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn delete_pattern_removes_prefix_matches_only() {
        let cache = CacheService::new();
        cache.set("products:list:cat=:search=:page=1", json!(1), Duration::from_secs(60));
        cache.set("products:list:cat=gowns:search=:page=2", json!(2), Duration::from_secs(60));
        cache.set("categories:list", json!(3), Duration::from_secs(60));

        cache.delete_pattern("products:*");

        assert_eq!(cache.get("products:list:cat=:search=:page=1"), None);
        assert_eq!(cache.get("products:list:cat=gowns:search=:page=2"), None);
        assert_eq!(cache.get("categories:list"), Some(json!(3)));
    }

    #[test]
    fn pattern_without_wildcard_is_single_delete() {
        let cache = CacheService::new();
        cache.set("product:detail:product:abc", json!(1), Duration::from_secs(60));
        cache.delete_pattern("product:detail:product:abc");
        assert_eq!(cache.get("product:detail:product:abc"), None);
    }
}
