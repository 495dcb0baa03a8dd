//! Core domain types for the itinerary planner.
//!
//! These mirror the data model directly: a closed set of plain structs and
//! a tagged `RouteItem` sum, not a class hierarchy.

use serde::{Deserialize, Serialize};

/// Travel mode; affects the transit-time function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Walking,
    Driving,
    Transit,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Walking
    }
}

/// A visitable point of interest, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text location hint, used as a geocoding input suffix.
    #[serde(default)]
    pub location_hint: Option<String>,
    /// Recommended visit duration in minutes, if known.
    #[serde(default)]
    pub recommended_duration_min: Option<i32>,
}

impl Spot {
    /// Text handed to the geocoder: name plus any location hint.
    pub fn geocode_query(&self, hotel_address: &str) -> String {
        match &self.location_hint {
            Some(hint) if !hint.trim().is_empty() => format!("{}, {}", self.name, hint),
            _ => format!("{}, {}", self.name, hotel_address),
        }
    }
}

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Cache key fragment: fixed precision so near-identical floats collide.
    pub fn key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A spot plus everything resolved during Phase A.
#[derive(Debug, Clone)]
pub struct ResolvedSpot {
    pub spot: Spot,
    pub coords: Coordinates,
    pub visit_duration_sec: i64,
}

/// A single transit leg between two locations at a specific departure time.
#[derive(Debug, Clone, Copy)]
pub struct TransitLeg {
    pub duration_sec: i64,
    pub distance_meters: Option<i64>,
}

impl TransitLeg {
    /// Sentinel meaning "no route found"; must never appear in a committed schedule.
    pub const UNREACHABLE: TransitLeg = TransitLeg {
        duration_sec: i64::MAX,
        distance_meters: None,
    };

    pub fn is_unreachable(&self) -> bool {
        self.duration_sec == i64::MAX
    }
}

/// Kind of meal break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Lunch,
    Dinner,
}

/// A tagged entry in a day's route. Invariant: `arrival_ts <= departure_ts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RouteItem {
    Anchor {
        spot_id: String,
        arrival_ts: i64,
        departure_ts: i64,
    },
    Visit {
        spot_id: String,
        arrival_ts: i64,
        departure_ts: i64,
    },
    MealBreak {
        meal: MealKind,
        arrival_ts: i64,
        departure_ts: i64,
    },
}

impl RouteItem {
    pub fn arrival_ts(&self) -> i64 {
        match self {
            RouteItem::Anchor { arrival_ts, .. }
            | RouteItem::Visit { arrival_ts, .. }
            | RouteItem::MealBreak { arrival_ts, .. } => *arrival_ts,
        }
    }

    pub fn departure_ts(&self) -> i64 {
        match self {
            RouteItem::Anchor { departure_ts, .. }
            | RouteItem::Visit { departure_ts, .. }
            | RouteItem::MealBreak { departure_ts, .. } => *departure_ts,
        }
    }

    pub fn spot_id(&self) -> Option<&str> {
        match self {
            RouteItem::Anchor { spot_id, .. } | RouteItem::Visit { spot_id, .. } => Some(spot_id),
            RouteItem::MealBreak { .. } => None,
        }
    }

    pub fn is_visit(&self) -> bool {
        matches!(self, RouteItem::Visit { .. })
    }
}

/// One day's committed route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_index: u32,
    pub date: chrono::NaiveDate,
    pub items: Vec<RouteItem>,
}

/// A single rendered leg for display: travel time and optional nav link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedLeg {
    pub from_id: String,
    pub to_id: String,
    pub duration_label: String,
    pub duration_min: i64,
    pub navigation_url: Option<String>,
}

/// A rendered visit/anchor/meal entry, as exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryEntry {
    pub label: String,
    pub spot_id: Option<String>,
    pub arrival_ts: i64,
    pub departure_ts: i64,
    /// This entry's own dwell time (visit/meal duration; 0 for an anchor).
    pub duration_min: i64,
    /// Travel time from the previous entry into this one, rendered as
    /// `"Hh Mm"` or `"Mm"`. `None` for the first entry of a day.
    pub travel_duration_label: Option<String>,
    pub travel_duration_min: Option<i64>,
    /// Navigation link to the next non-meal, non-same-location entry.
    pub navigation_url: Option<String>,
}

/// A rendered day, with a display header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day_index: u32,
    pub date: chrono::NaiveDate,
    pub header: String,
    pub entries: Vec<ItineraryEntry>,
}

/// The final, externally-consumed itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub title: String,
    pub total_duration_min: i64,
    pub total_travel_time_min: i64,
    pub total_distance_meters: Option<i64>,
    pub days: Vec<ItineraryDay>,
    pub fallback_used: bool,
}
