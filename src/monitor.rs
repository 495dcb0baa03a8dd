//! Process-wide counters, phase timings, and a recent-request log (C8).
//!
//! Singleton-shaped but constructor-injected, per `spec.md` §9: callers hold
//! an `Arc<Monitor>` rather than reaching for ambient global state, which
//! keeps it trivially resettable in tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    pub geocode_ms: u64,
    pub pairwise_ms: u64,
    pub planning_ms: u64,
    pub build_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RequestTrace {
    pub session_id: String,
    pub success: bool,
    pub fallback_used: bool,
    pub error_kind: Option<String>,
    pub timings: PhaseTimings,
}

#[derive(Debug, Default)]
pub struct Stats {
    pub requests_total: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub fallbacks_used: u64,
    pub provider_calls: u64,
    /// Map-provider calls broken down by endpoint (`spec.md` §4.8), e.g.
    /// `"geocode"`, `"transit"`, `"navigation"`.
    pub provider_calls_by_endpoint: HashMap<String, u64>,
    /// Failed requests broken down by `PlannerError::kind()`.
    pub failures_by_kind: HashMap<String, u64>,
    pub retries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub requests_total: u64,
    pub success_rate: f64,
    pub fallback_rate: f64,
    pub cache_hit_rate: f64,
    pub recommendations: Vec<String>,
}

pub struct Monitor {
    requests_total: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_failed: AtomicU64,
    fallbacks_used: AtomicU64,
    provider_calls: AtomicU64,
    provider_calls_by_endpoint: Mutex<HashMap<String, u64>>,
    failures_by_kind: Mutex<HashMap<String, u64>>,
    retries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    recent: Mutex<VecDeque<RequestTrace>>,
    ring_capacity: usize,
}

impl Monitor {
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_succeeded: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            fallbacks_used: AtomicU64::new(0),
            provider_calls: AtomicU64::new(0),
            provider_calls_by_endpoint: Mutex::new(HashMap::new()),
            failures_by_kind: Mutex::new(HashMap::new()),
            retries: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            recent: Mutex::new(VecDeque::with_capacity(ring_capacity)),
            ring_capacity,
        }
    }

    /// Records a call to the map provider, bucketed by endpoint
    /// (`"geocode"`, `"transit"`, `"navigation"`) per `spec.md` §4.8.
    pub fn record_provider_call(&self, endpoint: &str) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
        let mut by_endpoint = self.provider_calls_by_endpoint.lock().unwrap();
        *by_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request(&self, trace: RequestTrace) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if trace.success {
            self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
            if let Some(kind) = &trace.error_kind {
                let mut by_kind = self.failures_by_kind.lock().unwrap();
                *by_kind.entry(kind.clone()).or_insert(0) += 1;
            }
        }
        if trace.fallback_used {
            self.fallbacks_used.fetch_add(1, Ordering::Relaxed);
        }

        let mut recent = self.recent.lock().unwrap();
        recent.push_back(trace);
        while recent.len() > self.ring_capacity {
            recent.pop_front();
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            fallbacks_used: self.fallbacks_used.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            provider_calls_by_endpoint: self.provider_calls_by_endpoint.lock().unwrap().clone(),
            failures_by_kind: self.failures_by_kind.lock().unwrap().clone(),
            retries: self.retries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn recent_logs(&self, limit: usize, errors_only: bool) -> Vec<RequestTrace> {
        let recent = self.recent.lock().unwrap();
        recent
            .iter()
            .rev()
            .filter(|trace| !errors_only || !trace.success)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn report(&self) -> Report {
        let stats = self.stats();
        let success_rate = ratio(stats.requests_succeeded, stats.requests_total);
        let fallback_rate = ratio(stats.fallbacks_used, stats.requests_total);
        let cache_hit_rate = ratio(stats.cache_hits, stats.cache_hits + stats.cache_misses);

        let mut recommendations = Vec::new();
        if stats.requests_total > 0 && fallback_rate > 0.10 {
            recommendations.push(
                "fallback rate above 10%: check map provider credentials and quota".to_string(),
            );
        }
        if stats.requests_total > 0 && success_rate < 0.95 {
            recommendations.push("success rate below 95%: inspect recent error logs".to_string());
        }

        Report {
            requests_total: stats.requests_total,
            success_rate,
            fallback_rate,
            cache_hit_rate,
            recommendations,
        }
    }

    /// Resets all counters and the recent-request log. Intended for tests.
    pub fn reset(&self) {
        self.requests_total.store(0, Ordering::Relaxed);
        self.requests_succeeded.store(0, Ordering::Relaxed);
        self.requests_failed.store(0, Ordering::Relaxed);
        self.fallbacks_used.store(0, Ordering::Relaxed);
        self.provider_calls.store(0, Ordering::Relaxed);
        self.provider_calls_by_endpoint.lock().unwrap().clear();
        self.failures_by_kind.lock().unwrap().clear();
        self.retries.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.recent.lock().unwrap().clear();
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Measures a closure's wall-clock duration in milliseconds.
pub fn time_phase<T>(f: impl FnOnce() -> T) -> (T, u64) {
    let start = std::time::Instant::now();
    let result = f();
    (result, elapsed_ms(start))
}

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_reports_fallback_rate() {
        let monitor = Monitor::new(10);
        monitor.record_request(RequestTrace {
            session_id: "s1".to_string(),
            success: true,
            fallback_used: true,
            error_kind: None,
            timings: PhaseTimings::default(),
        });
        monitor.record_request(RequestTrace {
            session_id: "s2".to_string(),
            success: true,
            fallback_used: false,
            error_kind: None,
            timings: PhaseTimings::default(),
        });

        let report = monitor.report();
        assert_eq!(report.requests_total, 2);
        assert!((report.fallback_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ring_buffer_is_bounded() {
        let monitor = Monitor::new(2);
        for i in 0..5 {
            monitor.record_request(RequestTrace {
                session_id: format!("s{i}"),
                success: true,
                fallback_used: false,
                error_kind: None,
                timings: PhaseTimings::default(),
            });
        }
        assert_eq!(monitor.recent_logs(10, false).len(), 2);
    }

    #[test]
    fn recent_logs_errors_only_filters() {
        let monitor = Monitor::new(10);
        monitor.record_request(RequestTrace {
            session_id: "ok".to_string(),
            success: true,
            fallback_used: false,
            error_kind: None,
            timings: PhaseTimings::default(),
        });
        monitor.record_request(RequestTrace {
            session_id: "bad".to_string(),
            success: false,
            fallback_used: false,
            error_kind: Some("ProviderNetwork".to_string()),
            timings: PhaseTimings::default(),
        });
        let errors = monitor.recent_logs(10, true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].session_id, "bad");
    }

    #[test]
    fn reset_clears_everything() {
        let monitor = Monitor::new(10);
        monitor.record_provider_call("geocode");
        monitor.record_request(RequestTrace {
            session_id: "s1".to_string(),
            success: true,
            fallback_used: false,
            error_kind: None,
            timings: PhaseTimings::default(),
        });
        monitor.reset();
        let stats = monitor.stats();
        assert_eq!(stats.requests_total, 0);
        assert_eq!(stats.provider_calls, 0);
        assert!(stats.provider_calls_by_endpoint.is_empty());
        assert!(stats.failures_by_kind.is_empty());
        assert!(monitor.recent_logs(10, false).is_empty());
    }

    #[test]
    fn provider_calls_are_bucketed_by_endpoint() {
        let monitor = Monitor::new(10);
        monitor.record_provider_call("geocode");
        monitor.record_provider_call("geocode");
        monitor.record_provider_call("transit");

        let stats = monitor.stats();
        assert_eq!(stats.provider_calls, 3);
        assert_eq!(stats.provider_calls_by_endpoint.get("geocode"), Some(&2));
        assert_eq!(stats.provider_calls_by_endpoint.get("transit"), Some(&1));
    }

    #[test]
    fn failures_are_bucketed_by_kind() {
        let monitor = Monitor::new(10);
        monitor.record_request(RequestTrace {
            session_id: "a".to_string(),
            success: false,
            fallback_used: false,
            error_kind: Some("ProviderNetwork".to_string()),
            timings: PhaseTimings::default(),
        });
        monitor.record_request(RequestTrace {
            session_id: "b".to_string(),
            success: false,
            fallback_used: false,
            error_kind: Some("ProviderNetwork".to_string()),
            timings: PhaseTimings::default(),
        });
        monitor.record_request(RequestTrace {
            session_id: "c".to_string(),
            success: false,
            fallback_used: false,
            error_kind: Some("Validation".to_string()),
            timings: PhaseTimings::default(),
        });

        let stats = monitor.stats();
        assert_eq!(stats.failures_by_kind.get("ProviderNetwork"), Some(&2));
        assert_eq!(stats.failures_by_kind.get("Validation"), Some(&1));
    }
}
