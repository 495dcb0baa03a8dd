//! `MapProvider` capability: geocoding, transit-time lookup, navigation
//! links. Exactly two implementors (`spec.md` §9 "Polymorphism over
//! providers") — the planner is written against this trait, never either
//! concrete type.

pub mod fallback;
pub mod real;

use crate::error::PlannerError;
use crate::types::{Coordinates, Mode};

pub use fallback::FallbackMapProvider;
pub use real::{RealMapProvider, RealMapProviderConfig};

/// Abstracts geocoding and time-dependent transit duration lookup.
///
/// Implementations must be safe for concurrent calls from multiple threads
/// (the planner fans out candidate probing with `rayon`).
pub trait MapProvider: Send + Sync {
    /// Resolves one textual address to coordinates.
    fn geocode(&self, address: &str) -> Result<Coordinates, PlannerError>;

    /// `departure` is the intended departure time (unix seconds); time of
    /// day affects transit schedules. Returns `(duration_sec, distance_meters)`.
    fn transit_time(
        &self,
        origin: Coordinates,
        dest: Coordinates,
        departure_unix_sec: i64,
        mode: Mode,
    ) -> Result<(i64, Option<i64>), PlannerError>;

    /// Pure, no I/O: a deep link a user can open to navigate the leg.
    /// `departure_unix_sec` is accepted for interface symmetry with
    /// `transit_time` (a future provider may render schedule-aware links)
    /// but the default rendering ignores it.
    fn navigation_link(
        &self,
        origin: Coordinates,
        dest: Coordinates,
        _departure_unix_sec: i64,
        mode: Mode,
    ) -> String {
        let mode_param = match mode {
            Mode::Walking => "walking",
            Mode::Driving => "driving",
            Mode::Transit => "transit",
        };
        format!(
            "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode={}",
            origin.lat, origin.lng, dest.lat, dest.lng, mode_param
        )
    }
}
