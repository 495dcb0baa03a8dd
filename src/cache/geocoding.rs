//! Address -> coordinates cache with TTL, oldest-insertion eviction, and
//! address normalization (`spec.md` §4.2).

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::PlannerError;
use crate::types::Coordinates;

use super::{normalize, CacheStats};

struct Entry {
    coords: Coordinates,
    inserted_at: Instant,
    inserted_unix: i64,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

pub struct GeocodingCache {
    default_ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, Entry>>,
    insertion_order: RwLock<VecDeque<String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeocodingCache {
    pub fn new(default_ttl: Duration, capacity: usize) -> Self {
        Self {
            default_ttl,
            capacity,
            entries: RwLock::new(HashMap::new()),
            insertion_order: RwLock::new(VecDeque::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, address: &str) -> Option<Coordinates> {
        let key = normalize(address);
        let mut entries = self.entries.write().unwrap();
        match entries.get(&key) {
            Some(entry) if !entry.is_expired() => {
                let coords = entry.coords;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(coords)
            }
            Some(_) => {
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn set(&self, address: &str, coords: Coordinates, ttl: Option<Duration>) {
        let key = normalize(address);
        let now_unix = chrono::Utc::now().timestamp();
        let mut entries = self.entries.write().unwrap();
        let is_new = !entries.contains_key(&key);
        entries.insert(
            key.clone(),
            Entry {
                coords,
                inserted_at: Instant::now(),
                inserted_unix: now_unix,
                ttl: ttl.unwrap_or(self.default_ttl),
            },
        );

        if is_new {
            let mut order = self.insertion_order.write().unwrap();
            order.push_back(key);
            while order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    entries.remove(&oldest);
                }
            }
        }
    }

    pub fn has(&self, address: &str) -> bool {
        let key = normalize(address);
        let entries = self.entries.read().unwrap();
        matches!(entries.get(&key), Some(entry) if !entry.is_expired())
    }

    pub fn delete(&self, address: &str) {
        let key = normalize(address);
        self.entries.write().unwrap().remove(&key);
    }

    /// Evicts every expired entry, returning the count removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().unwrap();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        let mut order = self.insertion_order.write().unwrap();
        order.retain(|key| entries.contains_key(key));
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap();
        let oldest_at = entries.values().map(|e| e.inserted_unix).min();
        CacheStats {
            size: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            oldest_at,
        }
    }

    /// Geocodes every address not already cached, via `geocode_fn`.
    /// Per-address failures are swallowed: a warmed cache is best-effort.
    pub fn preload<F>(&self, addresses: &[String], geocode_fn: F)
    where
        F: Fn(&str) -> Result<Coordinates, PlannerError>,
    {
        for address in addresses {
            if self.has(address) {
                continue;
            }
            if let Ok(coords) = geocode_fn(address) {
                self.set(address, coords, None);
            }
        }
    }
}
