//! Wire-level `Request`/`Response` types, validation, and normalization
//! (`spec.md` §6).
//!
//! `Request` carries `Option<T>` for anything whose default depends on
//! another field (`dailyEndHour` depends on `multiDay`), so `normalize` can
//! tell "not supplied" apart from "explicitly set to the default value".

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::types::{Itinerary, Mode, Spot};

const MIN_SPOTS: usize = 1;
const MAX_SPOTS: usize = 20;
const VISIT_DURATION_RANGE: std::ops::RangeInclusive<i32> = 15..=480;
const RECOMMENDED_DURATION_RANGE: std::ops::RangeInclusive<i32> = 15..=480;
const MAX_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=14;

const DAILY_END_HOUR_MULTI_DAY_DEFAULT: u32 = 22;
const DAILY_END_HOUR_SINGLE_DAY_DEFAULT: u32 = 20;
const DEFAULT_START_TIME: &str = "09:00";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    pub session_id: String,
    pub hotel: String,
    pub spots: Vec<Spot>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub visit_duration_default: Option<i32>,
    #[serde(default)]
    pub include_breaks: Option<bool>,
    #[serde(default)]
    pub multi_day: Option<bool>,
    #[serde(default)]
    pub daily_start_hour: Option<u32>,
    #[serde(default)]
    pub daily_end_hour: Option<u32>,
    #[serde(default)]
    pub max_days: Option<u32>,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub itinerary: Itinerary,
    pub fallback_used: bool,
    pub warnings: Vec<String>,
}

/// The request after defaulting and range validation, ready for the
/// planner. All fields are concrete; nothing here still needs a default.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub session_id: String,
    pub hotel: String,
    pub spots: Vec<Spot>,
    pub mode: Mode,
    pub visit_duration_default_sec: i64,
    pub include_breaks: bool,
    pub multi_day: bool,
    /// Day-1 opening hour parsed from `startTime` (`spec.md` §6). Clamped up
    /// to `daily_start_hour` by the planner so invariant 3 (`first.arrivalTs
    /// >= date@dailyStartHour`) always holds.
    pub start_hour: u32,
    pub start_minute: u32,
    pub daily_start_hour: u32,
    pub daily_end_hour: u32,
    pub max_days: u32,
    pub deadline_ms: u64,
}

impl Request {
    /// Validates ranges and applies defaults, per `spec.md` §6/§7.
    ///
    /// `dailyEndHour`'s default depends on `multiDay` (22 vs. 20) — the
    /// `Option` is what lets this tell "caller didn't say" from "caller
    /// said 22 explicitly".
    pub fn normalize(self) -> Result<NormalizedRequest, PlannerError> {
        if self.hotel.trim().is_empty() {
            return Err(PlannerError::Validation("hotel must not be empty".to_string()));
        }
        if self.spots.len() < MIN_SPOTS || self.spots.len() > MAX_SPOTS {
            return Err(PlannerError::Validation(format!(
                "spots must contain between {MIN_SPOTS} and {MAX_SPOTS} entries, got {}",
                self.spots.len()
            )));
        }

        let mut seen_ids = std::collections::HashSet::new();
        for spot in &self.spots {
            if spot.name.trim().is_empty() {
                return Err(PlannerError::Validation(format!(
                    "spot '{}' has an empty name",
                    spot.id
                )));
            }
            if !seen_ids.insert(spot.id.clone()) {
                return Err(PlannerError::Validation(format!(
                    "duplicate spot id '{}'",
                    spot.id
                )));
            }
            if let Some(minutes) = spot.recommended_duration_min {
                if !RECOMMENDED_DURATION_RANGE.contains(&minutes) {
                    return Err(PlannerError::Validation(format!(
                        "spot '{}' recommendedDurationMin out of range [15, 480]",
                        spot.id
                    )));
                }
            }
        }

        let multi_day = self.multi_day.unwrap_or(true);

        let start_time = self.start_time.as_deref().unwrap_or(DEFAULT_START_TIME);
        let (start_hour, start_minute) = crate::time::parse_hh_mm(start_time).ok_or_else(|| {
            PlannerError::Validation(format!("startTime '{start_time}' is not a valid HH:MM time"))
        })?;

        let visit_duration_default = self.visit_duration_default.unwrap_or(60);
        if !VISIT_DURATION_RANGE.contains(&visit_duration_default) {
            return Err(PlannerError::Validation(
                "visitDurationDefault out of range [15, 480]".to_string(),
            ));
        }

        let daily_start_hour = self.daily_start_hour.unwrap_or(9);
        if daily_start_hour > 23 {
            return Err(PlannerError::Validation(
                "dailyStartHour out of range [0, 23]".to_string(),
            ));
        }

        let daily_end_hour = self.daily_end_hour.unwrap_or(if multi_day {
            DAILY_END_HOUR_MULTI_DAY_DEFAULT
        } else {
            DAILY_END_HOUR_SINGLE_DAY_DEFAULT
        });
        if !(1..=24).contains(&daily_end_hour) {
            return Err(PlannerError::Validation(
                "dailyEndHour out of range [1, 24]".to_string(),
            ));
        }
        if daily_end_hour <= daily_start_hour {
            return Err(PlannerError::Validation(
                "dailyEndHour must be greater than dailyStartHour".to_string(),
            ));
        }

        let max_days = if multi_day {
            self.max_days.unwrap_or(7)
        } else {
            1
        };
        if !MAX_DAYS_RANGE.contains(&max_days) {
            return Err(PlannerError::Validation(
                "maxDays out of range [1, 14]".to_string(),
            ));
        }

        let deadline_ms = self.deadline_ms.unwrap_or(45_000);

        Ok(NormalizedRequest {
            session_id: self.session_id,
            hotel: self.hotel,
            spots: self.spots,
            mode: self.mode,
            visit_duration_default_sec: visit_duration_default as i64 * 60,
            include_breaks: self.include_breaks.unwrap_or(true),
            multi_day,
            start_hour,
            start_minute,
            daily_start_hour,
            daily_end_hour,
            max_days,
            deadline_ms,
        })
    }
}
