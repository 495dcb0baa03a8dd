//! Great-circle distance and mode-weighted duration estimation.
//!
//! Used by the deterministic fallback map provider, and by the fallback
//! planner's placeholder leg durations.

use crate::types::{Coordinates, Mode};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mode-dependent speed in meters/minute (`spec.md` §4.1).
pub fn mode_speed_m_per_min(mode: Mode) -> f64 {
    match mode {
        Mode::Walking => 80.0,
        Mode::Driving => 500.0,
        Mode::Transit => 300.0,
    }
}

/// Great-circle distance between two coordinates, in meters.
pub fn distance_meters(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c * 1000.0
}

/// Estimated travel duration in seconds at a given mode's speed.
pub fn duration_seconds(from: Coordinates, to: Coordinates, mode: Mode) -> i64 {
    let meters = distance_meters(from, to);
    let minutes = meters / mode_speed_m_per_min(mode);
    (minutes * 60.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_has_zero_distance() {
        let p = Coordinates::new(36.1, -115.1);
        assert!(distance_meters(p, p) < 1.0);
    }

    #[test]
    fn known_distance_las_vegas_to_los_angeles() {
        let lv = Coordinates::new(36.17, -115.14);
        let la = Coordinates::new(34.05, -118.24);
        let km = distance_meters(lv, la) / 1000.0;
        assert!(km > 350.0 && km < 400.0, "expected ~370km, got {km}");
    }

    #[test]
    fn driving_is_faster_than_walking() {
        let a = Coordinates::new(36.1, -115.1);
        let b = Coordinates::new(36.2, -115.2);
        let walk = duration_seconds(a, b, Mode::Walking);
        let drive = duration_seconds(a, b, Mode::Driving);
        assert!(drive < walk);
    }

    #[test]
    fn zero_distance_is_zero_duration() {
        let p = Coordinates::new(1.0, 1.0);
        assert_eq!(duration_seconds(p, p, Mode::Walking), 0);
    }
}
