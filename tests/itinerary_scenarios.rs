//! End-to-end scenarios against the deterministic fallback `MapProvider`,
//! mirroring the concrete cases used to validate the planner by hand.

use itinerary_planner::config::Config;
use itinerary_planner::error::PlannerError;
use itinerary_planner::request::Request;
use itinerary_planner::types::{Mode, Spot};
use itinerary_planner::Engine;

fn spot(id: &str, name: &str, hint: &str, minutes: Option<i32>) -> Spot {
    Spot {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        location_hint: Some(hint.to_string()),
        recommended_duration_min: minutes,
    }
}

fn request(spots: Vec<Spot>) -> Request {
    Request {
        session_id: "scenario".to_string(),
        hotel: "Times Square, New York".to_string(),
        spots,
        mode: Mode::Walking,
        start_time: Some("09:00".to_string()),
        visit_duration_default: None,
        include_breaks: Some(true),
        multi_day: Some(false),
        daily_start_hour: Some(9),
        daily_end_hour: Some(20),
        max_days: None,
        deadline_ms: Some(10_000),
    }
}

#[test]
fn s1_single_day_three_spots_includes_one_lunch_break() {
    let engine = Engine::new(Config::default());
    let spots = vec![
        spot("a", "Central Park", "NY", None),
        spot("b", "Met Museum", "NY", None),
        spot("c", "Statue of Liberty", "NY", None),
    ];
    let response = engine.plan_itinerary(request(spots)).unwrap();

    assert!(!response.fallback_used);
    assert_eq!(response.itinerary.days.len(), 1);

    let day = &response.itinerary.days[0];

    let visit_ids: Vec<&str> = day
        .entries
        .iter()
        .filter_map(|e| e.spot_id.as_deref())
        .filter(|id| *id != "hotel")
        .collect();
    assert_eq!(visit_ids.len(), 3);

    let lunch_count = day.entries.iter().filter(|e| e.label == "Lunch").count();
    assert_eq!(lunch_count, 1);
}

#[test]
fn s2_multi_day_rollover_splits_six_spots_with_no_repeats() {
    let engine = Engine::new(Config::default());
    let spots: Vec<Spot> = (0..6)
        .map(|i| spot(&format!("s{i}"), &format!("Spot {i}"), "NY", Some(180)))
        .collect();
    let mut req = request(spots);
    req.multi_day = Some(true);
    req.daily_start_hour = Some(9);
    req.daily_end_hour = Some(22);
    req.max_days = Some(7);
    req.include_breaks = Some(false);

    let response = engine.plan_itinerary(req).unwrap();
    assert!(!response.fallback_used);
    assert!(
        response.itinerary.days.len() >= 2,
        "six 3h visits in a 13h window must roll over into at least two days"
    );

    let mut scheduled: Vec<&str> = response
        .itinerary
        .days
        .iter()
        .flat_map(|d| d.entries.iter())
        .filter_map(|e| e.spot_id.as_deref())
        .filter(|id| *id != "hotel")
        .collect();
    let before = scheduled.len();
    scheduled.sort_unstable();
    scheduled.dedup();
    assert_eq!(scheduled.len(), before, "no spot is scheduled twice");

    for day in &response.itinerary.days {
        assert_eq!(day.entries.last().unwrap().label, "Hotel");
        if day.day_index > 1 {
            assert_eq!(day.entries.first().unwrap().label, "Hotel");
        }
    }
}

#[test]
fn s3_recommended_duration_is_preserved() {
    let engine = Engine::new(Config::default());
    let spots = vec![
        spot("x", "Big Museum", "NY", Some(180)),
        spot("y", "Small Shop", "NY", None),
    ];
    let response = engine.plan_itinerary(request(spots)).unwrap();
    let day = &response.itinerary.days[0];

    let x_entry = day.entries.iter().find(|e| e.spot_id.as_deref() == Some("x")).unwrap();
    assert_eq!(x_entry.duration_min, 180);

    let y_entry = day.entries.iter().find(|e| e.spot_id.as_deref() == Some("y")).unwrap();
    assert_eq!(y_entry.duration_min, 60);
}

#[test]
fn s5_meal_break_idempotence_across_identical_requests() {
    let engine = Engine::new(Config::default());
    let spots = vec![
        spot("a", "Central Park", "NY", None),
        spot("b", "Met Museum", "NY", None),
        spot("c", "Bronx Zoo", "NY", None),
        spot("d", "Yankee Stadium", "NY", None),
    ];

    let first = engine.plan_itinerary(request(spots.clone())).unwrap();
    let second = engine.plan_itinerary(request(spots)).unwrap();

    for response in [&first, &second] {
        for day in &response.itinerary.days {
            let lunches = day.entries.iter().filter(|e| e.label == "Lunch").count();
            let dinners = day.entries.iter().filter(|e| e.label == "Dinner").count();
            assert!(lunches <= 1);
            assert!(dinners <= 1);
        }
    }

    let spot_sequence = |r: &itinerary_planner::request::Response| -> Vec<Option<String>> {
        r.itinerary
            .days
            .iter()
            .flat_map(|d| d.entries.iter())
            .map(|e| e.spot_id.clone())
            .collect()
    };
    assert_eq!(spot_sequence(&first), spot_sequence(&second));
}

#[test]
fn one_spot_request_is_anchor_visit_anchor() {
    let engine = Engine::new(Config::default());
    let response = engine
        .plan_itinerary(request(vec![spot("a", "Central Park", "NY", None)]))
        .unwrap();
    let day = &response.itinerary.days[0];
    assert_eq!(day.entries.len(), 2);
    assert_eq!(day.entries[0].spot_id.as_deref(), Some("a"));
    assert_eq!(day.entries[1].spot_id.as_deref(), Some("hotel"));
}

#[test]
fn zero_spots_is_rejected_as_validation_error() {
    let engine = Engine::new(Config::default());
    let result = engine.plan_itinerary(request(Vec::new()));
    assert!(matches!(result, Err(PlannerError::Validation(_))));
}

#[test]
fn permutation_of_spot_order_yields_same_committed_set() {
    let engine = Engine::new(Config::default());
    let spots = vec![
        spot("a", "Central Park", "NY", None),
        spot("b", "Met Museum", "NY", None),
        spot("c", "Statue of Liberty", "NY", None),
    ];
    let mut reversed = spots.clone();
    reversed.reverse();

    let forward = engine.plan_itinerary(request(spots)).unwrap();
    let backward = engine.plan_itinerary(request(reversed)).unwrap();

    let committed = |r: &itinerary_planner::request::Response| -> std::collections::BTreeSet<String> {
        r.itinerary
            .days
            .iter()
            .flat_map(|d| d.entries.iter())
            .filter_map(|e| e.spot_id.clone())
            .filter(|id| id != "hotel")
            .collect()
    };
    assert_eq!(committed(&forward), committed(&backward));
}

#[test]
fn exceeding_twenty_spots_is_rejected() {
    let engine = Engine::new(Config::default());
    let spots: Vec<Spot> = (0..21)
        .map(|i| spot(&format!("s{i}"), &format!("Spot {i}"), "NY", None))
        .collect();
    let result = engine.plan_itinerary(request(spots));
    assert!(matches!(result, Err(PlannerError::Validation(_))));
}

#[test]
fn deadline_shorter_than_planning_surfaces_deadline_error() {
    let engine = Engine::new(Config::default());
    let mut req = request(vec![spot("a", "Central Park", "NY", None)]);
    req.deadline_ms = Some(0);
    let result = engine.plan_itinerary(req);
    assert!(matches!(result, Err(PlannerError::Deadline)));
}
