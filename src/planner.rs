//! Greedy time-dependent nearest-neighbor scheduler (C5) — the heart of the
//! design. See `spec.md` §4.5 for the algorithm this implements.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::deadline::Deadline;
use crate::error::PlannerError;
use crate::time::{hour_of_day, ts_at_hour, ts_at_hour_minute};
use crate::travel::{check_deadline, TravelContext};
use crate::types::{Coordinates, MealKind, ResolvedSpot, RouteItem, Spot};

pub const HOTEL_ID: &str = "hotel";

const LUNCH_WINDOW: std::ops::Range<u32> = 12..14;
const LUNCH_DURATION_SEC: i64 = 3600;
const DINNER_WINDOW: std::ops::Range<u32> = 17..19;
const DINNER_DURATION_SEC: i64 = 5400;

#[derive(Debug, Clone)]
pub struct PlannerInput {
    pub hotel_address: String,
    pub spots: Vec<Spot>,
    /// Day-1 opening time from `startTime` (`spec.md` §6). Clamped up to
    /// `daily_start_hour` in `plan()` so the day-1 cursor never precedes the
    /// daily window's own start.
    pub start_hour: u32,
    pub start_minute: u32,
    pub daily_start_hour: u32,
    pub daily_end_hour: u32,
    pub visit_duration_default_sec: i64,
    pub include_breaks: bool,
    pub max_days: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug)]
pub struct PlannerOutput {
    pub days: Vec<crate::types::DayPlan>,
    pub resolved: HashMap<String, ResolvedSpot>,
    pub hotel_coords: Coordinates,
    pub warnings: Vec<String>,
    /// Set when the greedy algorithm could not proceed at all (empty
    /// result) and the caller should hand off to the fallback planner.
    pub needs_fallback: bool,
}

pub fn plan(
    travel: &TravelContext,
    input: &PlannerInput,
    deadline: &Deadline,
) -> Result<PlannerOutput, PlannerError> {
    check_deadline(deadline)?;
    let hotel_coords = travel.geocode(&input.hotel_address)?;

    let (resolved_spots, mut warnings) = resolve_spots(travel, input, hotel_coords)?;

    if resolved_spots.is_empty() {
        return Ok(PlannerOutput {
            days: Vec::new(),
            resolved: HashMap::new(),
            hotel_coords,
            warnings,
            needs_fallback: true,
        });
    }

    let resolved_index: HashMap<String, ResolvedSpot> = resolved_spots
        .iter()
        .map(|rs| (rs.spot.id.clone(), rs.clone()))
        .collect();

    let mut unvisited = resolved_spots;
    let mut days = Vec::new();
    let mut day_index = 1u32;
    let mut date = input.start_date;
    let mut needs_fallback = false;

    while !unvisited.is_empty() && day_index <= input.max_days {
        check_deadline(deadline)?;
        let end_of_day = ts_at_hour(date, input.daily_end_hour);
        let daily_start_ts = ts_at_hour(date, input.daily_start_hour);
        let mut cursor_ts = if day_index == 1 {
            ts_at_hour_minute(date, input.start_hour, input.start_minute).max(daily_start_ts)
        } else {
            daily_start_ts
        };
        let mut items = Vec::new();
        let mut current_location;

        if day_index == 1 {
            match select_first_step(travel, &unvisited, hotel_coords, cursor_ts, end_of_day)? {
                Some((idx, travel_sec)) => {
                    let rs = unvisited.remove(idx);
                    let arrival = cursor_ts + travel_sec;
                    let departure = arrival + rs.visit_duration_sec;
                    items.push(RouteItem::Visit {
                        spot_id: rs.spot.id.clone(),
                        arrival_ts: arrival,
                        departure_ts: departure,
                    });
                    cursor_ts = departure;
                    current_location = rs.coords;
                }
                None => {
                    needs_fallback = true;
                    break;
                }
            }
        } else {
            items.push(RouteItem::Anchor {
                spot_id: HOTEL_ID.to_string(),
                arrival_ts: cursor_ts,
                departure_ts: cursor_ts,
            });
            current_location = hotel_coords;
        }

        let mut lunch_done = false;
        let mut dinner_done = false;

        loop {
            check_deadline(deadline)?;

            if input.include_breaks {
                let hour = hour_of_day(cursor_ts);
                if !lunch_done && LUNCH_WINDOW.contains(&hour) {
                    items.push(RouteItem::MealBreak {
                        meal: MealKind::Lunch,
                        arrival_ts: cursor_ts,
                        departure_ts: cursor_ts + LUNCH_DURATION_SEC,
                    });
                    cursor_ts += LUNCH_DURATION_SEC;
                    lunch_done = true;
                    continue;
                }
                if !dinner_done && DINNER_WINDOW.contains(&hour) {
                    items.push(RouteItem::MealBreak {
                        meal: MealKind::Dinner,
                        arrival_ts: cursor_ts,
                        departure_ts: cursor_ts + DINNER_DURATION_SEC,
                    });
                    cursor_ts += DINNER_DURATION_SEC;
                    dinner_done = true;
                    continue;
                }
            }

            if unvisited.is_empty() {
                break;
            }

            match select_next(
                travel,
                &unvisited,
                current_location,
                hotel_coords,
                cursor_ts,
                end_of_day,
            )? {
                Some((idx, travel_sec)) => {
                    let rs = unvisited.remove(idx);
                    let arrival = cursor_ts + travel_sec;
                    let departure = arrival + rs.visit_duration_sec;
                    items.push(RouteItem::Visit {
                        spot_id: rs.spot.id.clone(),
                        arrival_ts: arrival,
                        departure_ts: departure,
                    });
                    cursor_ts = departure;
                    current_location = rs.coords;
                }
                None => break,
            }
        }

        let back = travel.transit(current_location, hotel_coords, cursor_ts)?;
        let arrival_back = if back.is_unreachable() {
            cursor_ts
        } else {
            cursor_ts + back.duration_sec
        };
        items.push(RouteItem::Anchor {
            spot_id: HOTEL_ID.to_string(),
            arrival_ts: arrival_back,
            departure_ts: arrival_back,
        });

        days.push(crate::types::DayPlan {
            day_index,
            date,
            items,
        });

        date = date.succ_opt().expect("calendar date does not overflow");
        day_index += 1;
    }

    if !needs_fallback && !unvisited.is_empty() {
        let ids: Vec<&str> = unvisited.iter().map(|rs| rs.spot.id.as_str()).collect();
        warnings.push(format!(
            "{} spot(s) omitted: exceeded max days ({})",
            ids.len(),
            ids.join(", ")
        ));
    }

    Ok(PlannerOutput {
        days,
        resolved: resolved_index,
        hotel_coords,
        warnings,
        needs_fallback,
    })
}

/// Geocodes every spot in parallel, drops spots the provider cannot find
/// (with a warning), and pre-filters any spot that cannot reach the hotel
/// and back at all — a spot whose legs are permanently unreachable would
/// otherwise stall the day loop until `maxDays` is exhausted.
fn resolve_spots(
    travel: &TravelContext,
    input: &PlannerInput,
    hotel_coords: Coordinates,
) -> Result<(Vec<ResolvedSpot>, Vec<String>), PlannerError> {
    let geocoded: Result<Vec<Option<ResolvedSpot>>, PlannerError> = input
        .spots
        .par_iter()
        .map(|spot| -> Result<Option<ResolvedSpot>, PlannerError> {
            let query = spot.geocode_query(&input.hotel_address);
            match travel.geocode(&query) {
                Ok(coords) => Ok(Some(ResolvedSpot {
                    spot: spot.clone(),
                    coords,
                    visit_duration_sec: spot
                        .recommended_duration_min
                        .map(|m| m as i64 * 60)
                        .unwrap_or(input.visit_duration_default_sec),
                })),
                Err(PlannerError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .collect();

    let mut warnings = Vec::new();
    let mut resolved = Vec::new();
    for (spot, outcome) in input.spots.iter().zip(geocoded?) {
        match outcome {
            Some(rs) => resolved.push(rs),
            None => warnings.push(format!(
                "spot '{}' could not be geocoded and was dropped",
                spot.name
            )),
        }
    }

    let probe_ts = ts_at_hour(input.start_date, input.daily_start_hour);
    let reachability: Result<Vec<bool>, PlannerError> = resolved
        .par_iter()
        .map(|rs| -> Result<bool, PlannerError> {
            let to = travel.transit(hotel_coords, rs.coords, probe_ts)?;
            let from = travel.transit(rs.coords, hotel_coords, probe_ts)?;
            Ok(!to.is_unreachable() && !from.is_unreachable())
        })
        .collect();

    let reachability = reachability?;
    let mut reachable = Vec::new();
    for (rs, ok) in resolved.into_iter().zip(reachability) {
        if ok {
            reachable.push(rs);
        } else {
            warnings.push(format!(
                "spot '{}' is unreachable from the hotel and was omitted",
                rs.spot.name
            ));
        }
    }

    Ok((reachable, warnings))
}

/// Day-1 first step: minimize `travel(hotel -> u)` among candidates that
/// can still return to the hotel before end of day.
fn select_first_step(
    travel: &TravelContext,
    unvisited: &[ResolvedSpot],
    hotel_coords: Coordinates,
    cursor_ts: i64,
    end_of_day: i64,
) -> Result<Option<(usize, i64)>, PlannerError> {
    let probes: Result<Vec<Option<Candidate>>, PlannerError> = unvisited
        .par_iter()
        .enumerate()
        .map(|(idx, u)| -> Result<Option<Candidate>, PlannerError> {
            let to_spot = travel.transit(hotel_coords, u.coords, cursor_ts)?;
            if to_spot.is_unreachable() {
                return Ok(None);
            }
            let arrival = cursor_ts + to_spot.duration_sec;
            let departure = arrival + u.visit_duration_sec;
            let back = travel.transit(u.coords, hotel_coords, departure)?;
            if back.is_unreachable() {
                return Ok(None);
            }
            if departure + back.duration_sec <= end_of_day {
                Ok(Some(Candidate {
                    idx,
                    travel_sec: to_spot.duration_sec,
                    travel_plus_visit_sec: to_spot.duration_sec + u.visit_duration_sec,
                }))
            } else {
                Ok(None)
            }
        })
        .collect();

    Ok(best_candidate(probes?, unvisited).map(|c| (c.idx, c.travel_sec)))
}

/// Inner-loop next-spot selection: feasibility test plus the deterministic
/// tie-break (`spec.md` §4.5).
fn select_next(
    travel: &TravelContext,
    unvisited: &[ResolvedSpot],
    current_location: Coordinates,
    hotel_coords: Coordinates,
    cursor_ts: i64,
    end_of_day: i64,
) -> Result<Option<(usize, i64)>, PlannerError> {
    let probes: Result<Vec<Option<Candidate>>, PlannerError> = unvisited
        .par_iter()
        .enumerate()
        .map(|(idx, u)| -> Result<Option<Candidate>, PlannerError> {
            let t1 = travel.transit(current_location, u.coords, cursor_ts)?;
            if t1.is_unreachable() {
                return Ok(None);
            }
            let arrival = cursor_ts + t1.duration_sec;
            let departure = arrival + u.visit_duration_sec;
            let t2 = travel.transit(u.coords, hotel_coords, departure)?;
            if t2.is_unreachable() {
                return Ok(None);
            }
            if departure + t2.duration_sec <= end_of_day {
                Ok(Some(Candidate {
                    idx,
                    travel_sec: t1.duration_sec,
                    travel_plus_visit_sec: t1.duration_sec + u.visit_duration_sec,
                }))
            } else {
                Ok(None)
            }
        })
        .collect();

    Ok(best_candidate(probes?, unvisited).map(|c| (c.idx, c.travel_sec)))
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    travel_sec: i64,
    travel_plus_visit_sec: i64,
}

/// Applies the deterministic tie-break: smallest travel time, then smallest
/// travel+visit, then lexicographically smallest spot id. Results are
/// gathered from the parallel probe before this runs, so parallelism never
/// leaks into the choice (`spec.md` §4.5/§9).
fn best_candidate(probes: Vec<Option<Candidate>>, unvisited: &[ResolvedSpot]) -> Option<Candidate> {
    probes.into_iter().flatten().fold(None, |best, cand| {
        match best {
            None => Some(cand),
            Some(b) => {
                let ordering = cand
                    .travel_sec
                    .cmp(&b.travel_sec)
                    .then(cand.travel_plus_visit_sec.cmp(&b.travel_plus_visit_sec))
                    .then(unvisited[cand.idx].spot.id.cmp(&unvisited[b.idx].spot.id));
                if ordering == Ordering::Less {
                    Some(cand)
                } else {
                    Some(b)
                }
            }
        }
    })
}
