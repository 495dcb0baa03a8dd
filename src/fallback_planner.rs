//! Deterministic best-effort scheduler (C7), used when C5 cannot proceed.
//!
//! Takes spots in input order, assigns each its default visit duration, and
//! inserts a fixed mode-weighted transit estimate between stops. Always
//! succeeds unless `spots` is empty (`spec.md` §4.7).

use crate::request::NormalizedRequest;
use crate::time::{ts_at_hour, ts_at_hour_minute};
use crate::types::{DayPlan, Mode, RouteItem};

use crate::planner::HOTEL_ID;

fn fixed_transit_minutes(mode: Mode) -> i64 {
    match mode {
        Mode::Walking => 15,
        Mode::Driving => 10,
        Mode::Transit => 20,
    }
}

pub struct FallbackOutput {
    pub days: Vec<DayPlan>,
}

pub fn plan(input: &NormalizedRequest, start_date: chrono::NaiveDate) -> FallbackOutput {
    let transit_sec = fixed_transit_minutes(input.mode) * 60;
    let mut days = Vec::new();

    if input.spots.is_empty() {
        return FallbackOutput { days };
    }

    let mut remaining = input.spots.clone();
    let mut date = start_date;
    let mut day_index = 1u32;
    let max_days = if input.multi_day { input.max_days } else { 1 };

    while !remaining.is_empty() && day_index <= max_days {
        let daily_start_ts = ts_at_hour(date, input.daily_start_hour);
        let mut cursor_ts = if day_index == 1 {
            ts_at_hour_minute(date, input.start_hour, input.start_minute).max(daily_start_ts)
        } else {
            daily_start_ts
        };
        let end_of_day = ts_at_hour(date, input.daily_end_hour);
        let mut items = vec![RouteItem::Anchor {
            spot_id: HOTEL_ID.to_string(),
            arrival_ts: cursor_ts,
            departure_ts: cursor_ts,
        }];

        while !remaining.is_empty() {
            let visit_sec = remaining[0]
                .recommended_duration_min
                .map(|m| m as i64 * 60)
                .unwrap_or(input.visit_duration_default_sec);
            let arrival = cursor_ts + transit_sec;
            let departure = arrival + visit_sec;
            let back = departure + transit_sec;
            if back > end_of_day && items.len() > 1 {
                break;
            }
            let spot = remaining.remove(0);
            items.push(RouteItem::Visit {
                spot_id: spot.id,
                arrival_ts: arrival,
                departure_ts: departure,
            });
            cursor_ts = departure;
        }

        let arrival_back = cursor_ts + transit_sec;
        items.push(RouteItem::Anchor {
            spot_id: HOTEL_ID.to_string(),
            arrival_ts: arrival_back,
            departure_ts: arrival_back,
        });

        days.push(DayPlan {
            day_index,
            date,
            items,
        });

        date = date.succ_opt().expect("calendar date does not overflow");
        day_index += 1;
    }

    FallbackOutput { days }
}
