//! Cached, retried, monitored access to a `MapProvider`.
//!
//! Shared by the planner and the schedule builder so caching and retry
//! policy live in exactly one place.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{GeocodingCache, TransitCache};
use crate::deadline::Deadline;
use crate::error::PlannerError;
use crate::monitor::Monitor;
use crate::provider::MapProvider;
use crate::types::{Coordinates, Mode, TransitLeg};

/// Exponential backoff schedule for `ProviderRateLimit`, per `spec.md` §5.
const RETRY_BACKOFFS_MS: [u64; 3] = [250, 500, 1000];

pub struct TravelContext {
    pub provider: Arc<dyn MapProvider>,
    pub geocoding_cache: Arc<GeocodingCache>,
    pub transit_cache: Arc<TransitCache>,
    pub monitor: Arc<Monitor>,
    pub mode: Mode,
}

impl TravelContext {
    /// Resolves an address to coordinates, checking the cache first and
    /// retrying `ProviderRateLimit` up to 3 times with backoff.
    pub fn geocode(&self, address: &str) -> Result<Coordinates, PlannerError> {
        if let Some(coords) = self.geocoding_cache.get(address) {
            self.monitor.record_cache_hit();
            return Ok(coords);
        }
        self.monitor.record_cache_miss();

        let mut attempt = 0usize;
        loop {
            self.monitor.record_provider_call("geocode");
            match self.provider.geocode(address) {
                Ok(coords) => {
                    self.geocoding_cache.set(address, coords, None);
                    return Ok(coords);
                }
                Err(PlannerError::ProviderRateLimit) if attempt < RETRY_BACKOFFS_MS.len() => {
                    self.monitor.record_retry();
                    std::thread::sleep(Duration::from_millis(RETRY_BACKOFFS_MS[attempt]));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Looks up the transit leg between two points at a given departure
    /// time, checking the cache first. A `NotFound` from the provider is
    /// translated into `TransitLeg::UNREACHABLE` rather than propagated —
    /// "no route found" is data, not a failure (`spec.md` §3).
    pub fn transit(
        &self,
        from: Coordinates,
        to: Coordinates,
        departure_unix_sec: i64,
    ) -> Result<TransitLeg, PlannerError> {
        if from.key() == to.key() {
            return Ok(TransitLeg {
                duration_sec: 0,
                distance_meters: Some(0),
            });
        }

        if let Some((duration, distance)) =
            self.transit_cache
                .get(from, to, self.mode, departure_unix_sec)
        {
            self.monitor.record_cache_hit();
            return Ok(TransitLeg {
                duration_sec: duration,
                distance_meters: distance,
            });
        }
        self.monitor.record_cache_miss();

        let mut attempt = 0usize;
        loop {
            self.monitor.record_provider_call("transit");
            match self
                .provider
                .transit_time(from, to, departure_unix_sec, self.mode)
            {
                Ok((duration, distance)) => {
                    self.transit_cache.set(
                        from,
                        to,
                        self.mode,
                        departure_unix_sec,
                        duration,
                        distance,
                        None,
                    );
                    return Ok(TransitLeg {
                        duration_sec: duration,
                        distance_meters: distance,
                    });
                }
                Err(PlannerError::NotFound(_)) => return Ok(TransitLeg::UNREACHABLE),
                Err(PlannerError::ProviderRateLimit) if attempt < RETRY_BACKOFFS_MS.len() => {
                    self.monitor.record_retry();
                    std::thread::sleep(Duration::from_millis(RETRY_BACKOFFS_MS[attempt]));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn navigation_link(&self, from: Coordinates, to: Coordinates, departure: i64) -> String {
        self.monitor.record_provider_call("navigation");
        self.provider.navigation_link(from, to, departure, self.mode)
    }
}

/// Checks the deadline, translating expiry into `PlannerError::Deadline`.
pub fn check_deadline(deadline: &Deadline) -> Result<(), PlannerError> {
    if deadline.is_expired() {
        Err(PlannerError::Deadline)
    } else {
        Ok(())
    }
}
