//! `(from, to, mode, departure bucket) -> duration` cache (`spec.md` §4.3).
//!
//! Departure is bucketed into 5-minute bins to bound cardinality while
//! preserving time-of-day sensitivity — the explicit cache-hit-rate vs.
//! time-of-day-fidelity tradeoff named in `spec.md` §9.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::types::{Coordinates, Mode};

use super::CacheStats;

const BUCKET_SECONDS: i64 = 300;

pub fn bucket(departure_unix_sec: i64) -> i64 {
    departure_unix_sec.div_euclid(BUCKET_SECONDS)
}

fn key(from: Coordinates, to: Coordinates, mode: Mode, departure_unix_sec: i64) -> String {
    format!(
        "{}|{}|{:?}|{}",
        from.key(),
        to.key(),
        mode,
        bucket(departure_unix_sec)
    )
}

struct Entry {
    duration_sec: i64,
    distance_meters: Option<i64>,
    inserted_at: Instant,
    inserted_unix: i64,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

pub struct TransitCache {
    default_ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, Entry>>,
    insertion_order: RwLock<VecDeque<String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TransitCache {
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

    pub fn get(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: Mode,
        departure_unix_sec: i64,
    ) -> Option<(i64, Option<i64>)> {
        let k = key(from, to, mode, departure_unix_sec);
        let mut entries = self.entries.write().unwrap();
        match entries.get(&k) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some((entry.duration_sec, entry.distance_meters))
            }
            Some(_) => {
                entries.remove(&k);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn set(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: Mode,
        departure_unix_sec: i64,
        duration_sec: i64,
        distance_meters: Option<i64>,
        ttl: Option<Duration>,
    ) {
        let k = key(from, to, mode, departure_unix_sec);
        let now_unix = chrono::Utc::now().timestamp();
        let mut entries = self.entries.write().unwrap();
        let is_new = !entries.contains_key(&k);
        entries.insert(
            k.clone(),
            Entry {
                duration_sec,
                distance_meters,
                inserted_at: Instant::now(),
                inserted_unix: now_unix,
                ttl: ttl.unwrap_or(self.default_ttl),
            },
        );

        if is_new {
            let mut order = self.insertion_order.write().unwrap();
            order.push_back(k);
            while order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    entries.remove(&oldest);
                }
            }
        }
    }

    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().unwrap();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            entries.remove(k);
        }
        let mut order = self.insertion_order.write().unwrap();
        order.retain(|k| entries.contains_key(k));
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
}
