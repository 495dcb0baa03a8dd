//! In-memory caches with TTL and oldest-insertion eviction (C2, C3).
//!
//! Both caches share the same shape: a `RwLock`-guarded map plus an
//! insertion-order queue for capacity eviction. A single lock section
//! covers the TTL check and the read, so `Get` can never observe a
//! stale-expired value even concurrently with eviction.

pub mod geocoding;
pub mod transit;

pub use geocoding::GeocodingCache;
pub use transit::TransitCache;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub oldest_at: Option<i64>,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Normalizes a cache key: lowercased, collapsed internal whitespace, trimmed.
pub fn normalize(text: &str) -> String {
    text.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("  Times   Square,  NY \n"), "times square, ny");
    }

    #[test]
    fn hit_rate_with_no_activity_is_zero() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
