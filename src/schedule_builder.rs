//! Converts the Planner's committed `DayPlan`s into the external
//! `Itinerary` model: rendered durations, per-leg navigation links, day
//! headers, and totals (`spec.md` §4.6).

use std::collections::HashMap;

use crate::time::{format_duration_minutes, seconds_to_minutes_round_half_up};
use crate::travel::TravelContext;
use crate::types::{Coordinates, DayPlan, Itinerary, ItineraryDay, ItineraryEntry, MealKind, ResolvedSpot, RouteItem};

use crate::planner::HOTEL_ID;

pub fn build(
    travel: &TravelContext,
    title: &str,
    days: &[DayPlan],
    resolved: &HashMap<String, ResolvedSpot>,
    hotel_coords: Coordinates,
    fallback_used: bool,
) -> Itinerary {
    let mut itinerary_days = Vec::with_capacity(days.len());
    let mut total_travel_time_min: i64 = 0;
    let mut total_distance_meters: i64 = 0;
    let mut have_distance = false;
    let mut total_duration_min: i64 = 0;

    for day in days {
        let (rendered_day, day_travel_min, day_distance, day_elapsed_min) =
            build_day(travel, day, resolved, hotel_coords);
        total_travel_time_min += day_travel_min;
        total_duration_min += day_elapsed_min;
        if let Some(distance) = day_distance {
            total_distance_meters += distance;
            have_distance = true;
        }
        itinerary_days.push(rendered_day);
    }

    Itinerary {
        title: title.to_string(),
        total_duration_min,
        total_travel_time_min,
        total_distance_meters: have_distance.then_some(total_distance_meters),
        days: itinerary_days,
        fallback_used,
    }
}

fn build_day(
    travel: &TravelContext,
    day: &DayPlan,
    resolved: &HashMap<String, ResolvedSpot>,
    hotel_coords: Coordinates,
) -> (ItineraryDay, i64, Option<i64>, i64) {
    let header = format!(
        "**Day {}** — {} {}",
        day.day_index,
        crate::time::weekday_abbrev(day.date),
        day.date
    );

    let mut entries = Vec::with_capacity(day.items.len());
    let mut travel_total_min: i64 = 0;
    let mut distance_total: i64 = 0;
    let mut have_distance = false;

    let mut prev_departure_ts: Option<i64> = None;
    let mut prev_location: Option<Coordinates> = None;

    for (idx, item) in day.items.iter().enumerate() {
        let location = location_of(item, hotel_coords, resolved, prev_location);

        let (travel_label, travel_min) = match (prev_departure_ts, prev_location) {
            (Some(prev_departure), Some(prev_loc)) => {
                let gap_sec = item.arrival_ts() - prev_departure;
                let minutes = seconds_to_minutes_round_half_up(gap_sec.max(0));
                travel_total_min += minutes;
                if prev_loc.key() != location.key() {
                    if let Some((_duration, distance)) = distance_between(travel, prev_loc, location) {
                        if let Some(meters) = distance {
                            distance_total += meters;
                            have_distance = true;
                        }
                    }
                }
                (Some(format_duration_minutes(minutes)), Some(minutes))
            }
            _ => (None, None),
        };

        let navigation_url = next_navigable(day, idx, resolved, hotel_coords)
            .map(|(to_coords, departure)| travel.navigation_link(location, to_coords, departure));

        entries.push(ItineraryEntry {
            label: label_for(item, resolved),
            spot_id: item.spot_id().map(|s| s.to_string()),
            arrival_ts: item.arrival_ts(),
            departure_ts: item.departure_ts(),
            duration_min: seconds_to_minutes_round_half_up(item.departure_ts() - item.arrival_ts()),
            travel_duration_label: travel_label,
            travel_duration_min: travel_min,
            navigation_url,
        });

        prev_departure_ts = Some(item.departure_ts());
        prev_location = Some(location);
    }

    let elapsed_min = match (day.items.first(), day.items.last()) {
        (Some(first), Some(last)) => {
            seconds_to_minutes_round_half_up(last.arrival_ts() - first.arrival_ts())
        }
        _ => 0,
    };

    (
        ItineraryDay {
            day_index: day.day_index,
            date: day.date,
            header,
            entries,
        },
        travel_total_min,
        have_distance.then_some(distance_total),
        elapsed_min,
    )
}

fn location_of(
    item: &RouteItem,
    hotel_coords: Coordinates,
    resolved: &HashMap<String, ResolvedSpot>,
    fallback: Option<Coordinates>,
) -> Coordinates {
    match item {
        RouteItem::Anchor { spot_id, .. } if spot_id == HOTEL_ID => hotel_coords,
        RouteItem::Anchor { spot_id, .. } | RouteItem::Visit { spot_id, .. } => resolved
            .get(spot_id)
            .map(|rs| rs.coords)
            .unwrap_or(hotel_coords),
        RouteItem::MealBreak { .. } => fallback.unwrap_or(hotel_coords),
    }
}

fn label_for(item: &RouteItem, resolved: &HashMap<String, ResolvedSpot>) -> String {
    match item {
        RouteItem::Anchor { spot_id, .. } if spot_id == HOTEL_ID => "Hotel".to_string(),
        RouteItem::Anchor { spot_id, .. } | RouteItem::Visit { spot_id, .. } => resolved
            .get(spot_id)
            .map(|rs| rs.spot.name.clone())
            .unwrap_or_else(|| spot_id.clone()),
        RouteItem::MealBreak { meal, .. } => match meal {
            MealKind::Lunch => "Lunch".to_string(),
            MealKind::Dinner => "Dinner".to_string(),
        },
    }
}

/// Finds the next non-meal, non-same-location item after `idx`, so
/// non-terminal entries can carry a navigation link (`spec.md` §4.6).
fn next_navigable(
    day: &DayPlan,
    idx: usize,
    resolved: &HashMap<String, ResolvedSpot>,
    hotel_coords: Coordinates,
) -> Option<(Coordinates, i64)> {
    let current = location_of(&day.items[idx], hotel_coords, resolved, None);
    day.items[idx + 1..].iter().find_map(|next| {
        if matches!(next, RouteItem::MealBreak { .. }) {
            return None;
        }
        let next_loc = location_of(next, hotel_coords, resolved, None);
        if next_loc.key() == current.key() {
            None
        } else {
            Some((next_loc, next.arrival_ts()))
        }
    })
}

fn distance_between(
    travel: &TravelContext,
    from: Coordinates,
    to: Coordinates,
) -> Option<(i64, Option<i64>)> {
    travel
        .transit(from, to, 0)
        .ok()
        .map(|leg| (leg.duration_sec, leg.distance_meters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{GeocodingCache, TransitCache};
    use crate::monitor::Monitor;
    use crate::provider::FallbackMapProvider;
    use crate::types::{Mode, Spot};
    use std::sync::Arc;
    use std::time::Duration;

    fn travel_ctx() -> TravelContext {
        TravelContext {
            provider: Arc::new(FallbackMapProvider::new()),
            geocoding_cache: Arc::new(GeocodingCache::new(Duration::from_secs(3600), 100)),
            transit_cache: Arc::new(TransitCache::new(Duration::from_secs(3600), 100)),
            monitor: Arc::new(Monitor::new(100)),
            mode: Mode::Walking,
        }
    }

    #[test]
    fn single_visit_day_renders_three_entries() {
        let travel = travel_ctx();
        let hotel_coords = Coordinates::new(0.0, 0.0);
        let spot_coords = Coordinates::new(0.01, 0.01);
        let mut resolved = HashMap::new();
        resolved.insert(
            "a".to_string(),
            ResolvedSpot {
                spot: Spot {
                    id: "a".to_string(),
                    name: "Central Park".to_string(),
                    category: None,
                    location_hint: None,
                    recommended_duration_min: None,
                },
                coords: spot_coords,
                visit_duration_sec: 3600,
            },
        );

        let day = DayPlan {
            day_index: 1,
            date: chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            items: vec![
                RouteItem::Visit {
                    spot_id: "a".to_string(),
                    arrival_ts: 1000,
                    departure_ts: 4600,
                },
                RouteItem::Anchor {
                    spot_id: HOTEL_ID.to_string(),
                    arrival_ts: 5000,
                    departure_ts: 5000,
                },
            ],
        };

        let itinerary = build(&travel, "Trip", &[day], &resolved, hotel_coords, false);
        assert_eq!(itinerary.days.len(), 1);
        assert_eq!(itinerary.days[0].entries.len(), 2);
        assert_eq!(itinerary.days[0].entries[0].label, "Central Park");
        assert!(itinerary.days[0].entries[0].navigation_url.is_some());
        assert!(itinerary.days[0].entries[1].travel_duration_min.is_some());
    }
}
