//! HTTP adapter to a transit-capable routing backend.
//!
//! Structurally the teacher's `osrm.rs` `OsrmClient`: a blocking
//! `reqwest::Client`, one endpoint for geocoding and one for pairwise
//! transit time, with backend statuses mapped into the error taxonomy.
//! Every outbound call is routed through a `RateLimiter`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::deadline::Deadline;
use crate::error::{status_to_error, PlannerError};
use crate::ratelimiter::RateLimiter;
use crate::types::{Coordinates, Mode};

use super::MapProvider;

#[derive(Debug, Clone)]
pub struct RealMapProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub call_timeout: Duration,
}

pub struct RealMapProvider {
    config: RealMapProviderConfig,
    client: reqwest::blocking::Client,
    limiter: Arc<RateLimiter>,
}

impl RealMapProvider {
    pub fn new(
        config: RealMapProviderConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, PlannerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| PlannerError::Internal(e.to_string()))?;
        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    fn acquire(&self, deadline: &Deadline) -> Result<(), PlannerError> {
        self.limiter.acquire(deadline)
    }

    fn handle_error_body(&self, status: reqwest::StatusCode, body: &str) -> PlannerError {
        if let Ok(err_body) = serde_json::from_str::<ProviderErrorBody>(body) {
            if err_body.code.as_deref() == Some("quotaExceeded") {
                return PlannerError::ProviderQuota;
            }
        }
        status_to_error(status, body.to_string())
    }
}

impl MapProvider for RealMapProvider {
    fn geocode(&self, address: &str) -> Result<Coordinates, PlannerError> {
        let deadline = Deadline::from_millis(self.config.call_timeout.as_millis() as u64);
        self.acquire(&deadline)?;

        let mut request = self
            .client
            .get(format!("{}/geocode", self.config.base_url))
            .query(&[("address", address)]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(self.handle_error_body(status, &body));
        }

        let body: GeocodeResponse = response
            .json()
            .map_err(|e| PlannerError::Internal(e.to_string()))?;

        match body.result {
            Some(result) => Ok(Coordinates::new(result.lat, result.lng)),
            None => Err(PlannerError::NotFound(address.to_string())),
        }
    }

    fn transit_time(
        &self,
        origin: Coordinates,
        dest: Coordinates,
        departure_unix_sec: i64,
        mode: Mode,
    ) -> Result<(i64, Option<i64>), PlannerError> {
        let deadline = Deadline::from_millis(self.config.call_timeout.as_millis() as u64);
        self.acquire(&deadline)?;

        let mode_param = match mode {
            Mode::Walking => "walking",
            Mode::Driving => "driving",
            Mode::Transit => "transit",
        };

        let mut request = self
            .client
            .get(format!("{}/transit-time", self.config.base_url))
            .query(&[
                ("origin_lat", origin.lat.to_string()),
                ("origin_lng", origin.lng.to_string()),
                ("dest_lat", dest.lat.to_string()),
                ("dest_lng", dest.lng.to_string()),
                ("departure", departure_unix_sec.to_string()),
                ("mode", mode_param.to_string()),
            ]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(self.handle_error_body(status, &body));
        }

        let body: TransitTimeResponse = response
            .json()
            .map_err(|e| PlannerError::Internal(e.to_string()))?;

        match body.duration_seconds {
            Some(duration) => Ok((duration, body.distance_meters)),
            None => Err(PlannerError::NotFound("no route found".to_string())),
        }
    }
}

// -----------------------------------------------------------------------------
// Backend response types
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    result: Option<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct TransitTimeResponse {
    duration_seconds: Option<i64>,
    distance_meters: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_link_is_pure_and_mode_aware() {
        let limiter = Arc::new(RateLimiter::new(10, 100));
        let provider = RealMapProvider::new(
            RealMapProviderConfig {
                base_url: "http://localhost:9".to_string(),
                api_key: None,
                call_timeout: Duration::from_secs(1),
            },
            limiter,
        )
        .unwrap();

        let link = provider.navigation_link(
            Coordinates::new(1.0, 2.0),
            Coordinates::new(3.0, 4.0),
            0,
            Mode::Transit,
        );
        assert!(link.contains("travelmode=transit"));
        assert!(link.contains("origin=1,2"));
    }
}
