//! S4/S6-style scenarios: provider failures and unreachable spots should
//! hand off to the fallback planner rather than surfacing to the caller.

use std::sync::Arc;
use std::time::Duration;

use itinerary_planner::cache::{GeocodingCache, TransitCache};
use itinerary_planner::error::PlannerError;
use itinerary_planner::monitor::Monitor;
use itinerary_planner::provider::MapProvider;
use itinerary_planner::request::NormalizedRequest;
use itinerary_planner::travel::TravelContext;
use itinerary_planner::types::{Coordinates, Mode, Spot};
use itinerary_planner::{fallback_planner, planner};

struct QuotaExhaustedProvider;

impl MapProvider for QuotaExhaustedProvider {
    fn geocode(&self, _address: &str) -> Result<Coordinates, PlannerError> {
        Err(PlannerError::ProviderQuota)
    }

    fn transit_time(
        &self,
        _origin: Coordinates,
        _dest: Coordinates,
        _departure_unix_sec: i64,
        _mode: Mode,
    ) -> Result<(i64, Option<i64>), PlannerError> {
        Err(PlannerError::ProviderQuota)
    }
}

fn travel_ctx(provider: Arc<dyn MapProvider>) -> TravelContext {
    TravelContext {
        provider,
        geocoding_cache: Arc::new(GeocodingCache::new(Duration::from_secs(3600), 100)),
        transit_cache: Arc::new(TransitCache::new(Duration::from_secs(3600), 100)),
        monitor: Arc::new(Monitor::new(100)),
        mode: Mode::Walking,
    }
}

fn spot(id: &str, name: &str) -> Spot {
    Spot {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        location_hint: None,
        recommended_duration_min: None,
    }
}

#[test]
fn s4_provider_quota_on_first_geocode_triggers_fallback_dispatch() {
    let travel = travel_ctx(Arc::new(QuotaExhaustedProvider));
    let input = planner::PlannerInput {
        hotel_address: "Times Square, New York".to_string(),
        spots: vec![spot("a", "Central Park"), spot("b", "Met Museum")],
        start_hour: 9,
        start_minute: 0,
        daily_start_hour: 9,
        daily_end_hour: 20,
        visit_duration_default_sec: 3600,
        include_breaks: true,
        max_days: 1,
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
    };
    let deadline = itinerary_planner::deadline::Deadline::from_millis(5_000);

    let result = planner::plan(&travel, &input, &deadline);
    let err = result.expect_err("quota exhaustion must surface as an error, not a partial plan");
    assert!(err.triggers_fallback());
    assert!(matches!(err, PlannerError::ProviderQuota));

    let normalized = NormalizedRequest {
        session_id: "s4".to_string(),
        hotel: input.hotel_address.clone(),
        spots: input.spots.clone(),
        mode: Mode::Walking,
        visit_duration_default_sec: 3600,
        include_breaks: true,
        multi_day: false,
        start_hour: 9,
        start_minute: 0,
        daily_start_hour: 9,
        daily_end_hour: 20,
        max_days: 1,
        deadline_ms: 5_000,
    };
    let fallback = fallback_planner::plan(&normalized, input.start_date);
    let scheduled: Vec<&str> = fallback
        .days
        .iter()
        .flat_map(|d| d.items.iter())
        .filter_map(|i| i.spot_id())
        .filter(|id| *id != "hotel")
        .collect();
    assert_eq!(scheduled, vec!["a", "b"]);
}

struct UnreachableMiddleProvider;

impl MapProvider for UnreachableMiddleProvider {
    fn geocode(&self, address: &str) -> Result<Coordinates, PlannerError> {
        match address {
            s if s.starts_with("Hotel") => Ok(Coordinates::new(0.0, 0.0)),
            s if s.starts_with("Unreachable") => Ok(Coordinates::new(50.0, 50.0)),
            _ => Ok(Coordinates::new(0.001, 0.001)),
        }
    }

    fn transit_time(
        &self,
        origin: Coordinates,
        dest: Coordinates,
        _departure_unix_sec: i64,
        _mode: Mode,
    ) -> Result<(i64, Option<i64>), PlannerError> {
        if origin.lat == 50.0 || dest.lat == 50.0 {
            return Err(PlannerError::NotFound("no route".to_string()));
        }
        Ok((300, Some(100)))
    }
}

#[test]
fn s6_unreachable_spot_is_dropped_with_a_warning() {
    let travel = travel_ctx(Arc::new(UnreachableMiddleProvider));
    let input = planner::PlannerInput {
        hotel_address: "Hotel Central".to_string(),
        spots: vec![
            spot("a", "Reachable A"),
            spot("b", "Unreachable Spot"),
            spot("c", "Reachable C"),
        ],
        start_hour: 9,
        start_minute: 0,
        daily_start_hour: 9,
        daily_end_hour: 20,
        visit_duration_default_sec: 3600,
        include_breaks: false,
        max_days: 1,
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
    };
    let deadline = itinerary_planner::deadline::Deadline::from_millis(5_000);

    let output = planner::plan(&travel, &input, &deadline).unwrap();
    assert!(!output.needs_fallback);

    let scheduled: Vec<&str> = output
        .days
        .iter()
        .flat_map(|d| d.items.iter())
        .filter_map(|i| i.spot_id())
        .filter(|id| *id != "hotel")
        .collect();
    assert_eq!(scheduled.len(), 2);
    assert!(!scheduled.contains(&"b"));
    assert!(output.warnings.iter().any(|w| w.contains("unreachable")));
}
