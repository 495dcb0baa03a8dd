//! Itinerary Planning Engine.
//!
//! Geocodes and ranks points of interest into a day-by-day travel schedule,
//! falling back to a deterministic best-effort schedule when the map
//! backend is unavailable.

pub mod cache;
pub mod config;
pub mod deadline;
pub mod error;
pub mod fallback_planner;
pub mod haversine;
pub mod monitor;
pub mod planner;
pub mod provider;
pub mod ratelimiter;
pub mod request;
pub mod schedule_builder;
pub mod time;
pub mod travel;
pub mod types;

use std::sync::Arc;

use tracing::{info, warn};

use cache::{GeocodingCache, TransitCache};
use config::Config;
use deadline::Deadline;
use error::PlannerError;
use monitor::{Monitor, PhaseTimings, RequestTrace};
use provider::{FallbackMapProvider, MapProvider, RealMapProvider, RealMapProviderConfig};
use ratelimiter::RateLimiter;
use request::{NormalizedRequest, Request, Response};
use travel::TravelContext;

/// Wires caches, rate limiter, and map provider behind a single handle.
/// Construct once per process; clone the `Arc` fields freely across
/// requests (`spec.md` §9 "Singleton caches and monitors").
pub struct Engine {
    config: Config,
    geocoding_cache: Arc<GeocodingCache>,
    transit_cache: Arc<TransitCache>,
    monitor: Arc<Monitor>,
    provider: Arc<dyn MapProvider>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let geocoding_cache = Arc::new(GeocodingCache::new(
            std::time::Duration::from_secs(config.geocoding_cache_ttl_seconds),
            config.max_cache_entries,
        ));
        let transit_cache = Arc::new(TransitCache::new(
            std::time::Duration::from_secs(config.route_cache_ttl_seconds),
            config.max_cache_entries,
        ));
        let monitor = Arc::new(Monitor::new(config.monitor_ring_capacity));
        let provider = build_provider(&config);

        Self {
            config,
            geocoding_cache,
            transit_cache,
            monitor,
            provider,
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    /// The single external operation: `PlanItinerary` (`spec.md` §6).
    pub fn plan_itinerary(&self, request: Request) -> Result<Response, PlannerError> {
        let session_id = request.session_id.clone();
        let deadline_ms = request.deadline_ms.unwrap_or(self.config.optimization_timeout_ms);
        let deadline = Deadline::from_millis(deadline_ms);

        let outcome = self.plan_itinerary_inner(request, &deadline);

        let trace = RequestTrace {
            session_id,
            success: outcome.is_ok(),
            fallback_used: outcome.as_ref().map(|r| r.fallback_used).unwrap_or(false),
            error_kind: outcome.as_ref().err().map(|e| e.kind().to_string()),
            timings: PhaseTimings::default(),
        };
        self.monitor.record_request(trace);

        outcome
    }

    fn plan_itinerary_inner(
        &self,
        request: Request,
        deadline: &Deadline,
    ) -> Result<Response, PlannerError> {
        let normalized = request.normalize()?;
        let mode = normalized.mode;

        let travel = TravelContext {
            provider: self.provider.clone(),
            geocoding_cache: self.geocoding_cache.clone(),
            transit_cache: self.transit_cache.clone(),
            monitor: self.monitor.clone(),
            mode,
        };

        let start_date = time::today();

        let planner_input = planner::PlannerInput {
            hotel_address: normalized.hotel.clone(),
            spots: normalized.spots.clone(),
            start_hour: normalized.start_hour,
            start_minute: normalized.start_minute,
            daily_start_hour: normalized.daily_start_hour,
            daily_end_hour: normalized.daily_end_hour,
            visit_duration_default_sec: normalized.visit_duration_default_sec,
            include_breaks: normalized.include_breaks,
            max_days: normalized.max_days,
            start_date,
        };

        match planner::plan(&travel, &planner_input, deadline) {
            Ok(output) if !output.needs_fallback => {
                let title = format!("Trip via {}", normalized.hotel);
                let itinerary = schedule_builder::build(
                    &travel,
                    &title,
                    &output.days,
                    &output.resolved,
                    output.hotel_coords,
                    false,
                );
                Ok(Response {
                    itinerary,
                    fallback_used: false,
                    warnings: output.warnings,
                })
            }
            Ok(output) => {
                warn!(session_id = %normalized.session_id, "planner produced no feasible schedule, falling back");
                Ok(self.fallback_response(&normalized, start_date, output.warnings))
            }
            Err(e) if e.triggers_fallback() => {
                info!(session_id = %normalized.session_id, error = %e, "provider failure, falling back");
                let warnings = vec![format!(
                    "map provider unavailable ({}): using fallback schedule",
                    e.kind()
                )];
                Ok(self.fallback_response(&normalized, start_date, warnings))
            }
            Err(e) => Err(e),
        }
    }

    fn fallback_response(
        &self,
        normalized: &NormalizedRequest,
        start_date: chrono::NaiveDate,
        mut warnings: Vec<String>,
    ) -> Response {
        let output = fallback_planner::plan(normalized, start_date);
        let hotel_coords = crate::types::Coordinates::new(0.0, 0.0);
        let resolved = std::collections::HashMap::new();

        let travel = TravelContext {
            provider: Arc::new(FallbackMapProvider::new()),
            geocoding_cache: self.geocoding_cache.clone(),
            transit_cache: self.transit_cache.clone(),
            monitor: self.monitor.clone(),
            mode: normalized.mode,
        };

        let title = format!("Trip via {} (fallback)", normalized.hotel);
        let itinerary = schedule_builder::build(&travel, &title, &output.days, &resolved, hotel_coords, true);
        if itinerary.days.is_empty() {
            warnings.push("no spots could be scheduled".to_string());
        }
        Response {
            itinerary,
            fallback_used: true,
            warnings,
        }
    }
}

fn build_provider(config: &Config) -> Arc<dyn MapProvider> {
    match &config.map_provider_base_url {
        Some(base_url) => {
            let limiter = Arc::new(RateLimiter::new(
                config.requests_per_second,
                config.requests_per_day,
            ));
            let real = RealMapProvider::new(
                RealMapProviderConfig {
                    base_url: base_url.clone(),
                    api_key: config.map_provider_api_key.clone(),
                    call_timeout: std::time::Duration::from_secs(config.provider_call_timeout_secs),
                },
                limiter,
            );
            match real {
                Ok(provider) => Arc::new(provider),
                Err(e) => {
                    warn!(error = %e, "failed to build real map provider, using fallback");
                    Arc::new(FallbackMapProvider::new())
                }
            }
        }
        None => Arc::new(FallbackMapProvider::new()),
    }
}
