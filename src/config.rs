//! Runtime configuration, enumerated in `spec.md` §6.
//!
//! `Config::from_env` reads the documented environment variables; anything
//! unset falls back to the default. No `.env` loading here — that is the
//! embedding binary's concern.

#[derive(Debug, Clone)]
pub struct Config {
    pub geocoding_cache_ttl_seconds: u64,
    pub route_cache_ttl_seconds: u64,
    pub max_cache_entries: usize,
    pub requests_per_second: u32,
    pub requests_per_day: u64,
    pub optimization_timeout_ms: u64,
    pub fallback_timeout_ms: u64,
    pub map_provider_base_url: Option<String>,
    pub map_provider_api_key: Option<String>,
    /// Per-call timeout before an outbound call is cancelled and surfaced
    /// as `ProviderNetwork` (`spec.md` §5).
    pub provider_call_timeout_secs: u64,
    /// Ring-buffer capacity for the Monitor's recent-request log.
    pub monitor_ring_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_cache_ttl_seconds: 86_400,
            route_cache_ttl_seconds: 3_600,
            max_cache_entries: 10_000,
            requests_per_second: 10,
            requests_per_day: 25_000,
            optimization_timeout_ms: 45_000,
            fallback_timeout_ms: 30_000,
            map_provider_base_url: None,
            map_provider_api_key: None,
            provider_call_timeout_secs: 10,
            monitor_ring_capacity: 500,
        }
    }
}

impl Config {
    /// Builds a `Config` from environment variables, falling back to
    /// `Config::default()` for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            geocoding_cache_ttl_seconds: env_u64(
                "GEOCODING_CACHE_TTL_SECONDS",
                defaults.geocoding_cache_ttl_seconds,
            ),
            route_cache_ttl_seconds: env_u64(
                "ROUTE_CACHE_TTL_SECONDS",
                defaults.route_cache_ttl_seconds,
            ),
            max_cache_entries: env_u64("MAX_CACHE_ENTRIES", defaults.max_cache_entries as u64)
                as usize,
            requests_per_second: env_u64("REQUESTS_PER_SECOND", defaults.requests_per_second as u64)
                as u32,
            requests_per_day: env_u64("REQUESTS_PER_DAY", defaults.requests_per_day),
            optimization_timeout_ms: env_u64(
                "OPTIMIZATION_TIMEOUT_MS",
                defaults.optimization_timeout_ms,
            ),
            fallback_timeout_ms: env_u64("FALLBACK_TIMEOUT_MS", defaults.fallback_timeout_ms),
            map_provider_base_url: std::env::var("MAP_PROVIDER_BASE_URL").ok(),
            map_provider_api_key: std::env::var("MAP_PROVIDER_API_KEY").ok(),
            provider_call_timeout_secs: defaults.provider_call_timeout_secs,
            monitor_ring_capacity: defaults.monitor_ring_capacity,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
