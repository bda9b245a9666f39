//! End-to-end trip scenarios against the built-in Sri Lanka knowledge.

use itinerary_core::rules::MANY_STOPS_WARNING;
use itinerary_core::testing::{
    assert_plan_invariants, assert_warning_contains, stop_names, ScenarioHarness,
};
use itinerary_core::{PlannerConfig, Region};

const LONG_HAUL_WARNING: &str = "High travel time between Cultural Triangle (Sigiriya) and East Coast (Arugam Bay). Difficult in < 10 days.";

#[tokio::test]
async fn test_monsoon_beach_trip_avoids_south_west() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(7, "August", &["beach", "wildlife"]).await;

    assert_plan_invariants(&plan);
    assert_warning_contains(&plan, "south_west");
    assert_warning_contains(&plan, "monsoon");
    assert_eq!(plan.avoided_regions, vec![Region::SouthWest]);
    assert_eq!(plan.suggested_region, Some(Region::EastCoast));
    assert_eq!(plan.max_stops, 4);
    assert_eq!(
        stop_names(&plan),
        vec!["Trincomalee", "Arugam Bay", "Yala", "Udawalawe"]
    );
    assert!(plan.itinerary.iter().all(|i| i.region != Region::SouthWest));
    assert_eq!(
        plan.itinerary[0].reason,
        "Good beach in east_coast this month"
    );
    assert_eq!(plan.itinerary[2].reason, "Matches 'wildlife' interest");
}

#[tokio::test]
async fn test_short_beach_and_history_trip_warns_about_distance() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(5, "july", &["beach", "history"]).await;

    assert_plan_invariants(&plan);
    assert!(plan.warnings.contains(LONG_HAUL_WARNING));
    assert!(plan.warnings.contains(MANY_STOPS_WARNING));
    assert_eq!(plan.max_stops, 3);
    assert_eq!(
        stop_names(&plan),
        vec!["Sigiriya", "Trincomalee", "Arugam Bay"]
    );
}

#[tokio::test]
async fn test_long_haul_warning_needs_both_places() {
    // Without history interest Sigiriya is never a candidate.
    let harness = ScenarioHarness::new();
    let plan = harness.plan(5, "july", &["beach"]).await;

    assert_plan_invariants(&plan);
    assert!(!plan.warnings.contains(LONG_HAUL_WARNING));

    // A long trip lifts the warning as well.
    let plan = harness.plan(12, "july", &["beach", "history"]).await;
    assert!(!plan.warnings.contains(LONG_HAUL_WARNING));
    assert!(!plan.warnings.contains(MANY_STOPS_WARNING));
}

#[tokio::test]
async fn test_no_distance_warning_for_a_stop_that_was_cut() {
    // Sigiriya is a candidate but only two stops fit in three days.
    let harness = ScenarioHarness::new();
    let plan = harness.plan(3, "july", &["beach", "history"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(plan.max_stops, 2);
    assert_eq!(stop_names(&plan), vec!["Trincomalee", "Arugam Bay"]);
    assert!(!plan.warnings.contains(LONG_HAUL_WARNING));
    assert!(plan.warnings.contains(MANY_STOPS_WARNING));
    assert_warning_contains(&plan, "south_west");
}

#[tokio::test]
async fn test_very_short_trip_warns_about_stops_once() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(3, "march", &["history", "hiking"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings.contains(MANY_STOPS_WARNING));
    assert_eq!(plan.max_stops, 2);
    assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla"]);
}

#[tokio::test]
async fn test_january_prefers_south_west_beaches() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(10, "January", &["beach", "hiking", "culture"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(plan.avoided_regions, vec![Region::EastCoast]);
    assert_eq!(plan.suggested_region, Some(Region::SouthWest));
    assert_eq!(
        stop_names(&plan),
        vec!["Kandy", "Nuwara Eliya", "Ella", "Mirissa", "Unawatuna"]
    );
    assert_eq!(
        plan.warnings.iter().cloned().collect::<Vec<_>>(),
        vec!["Avoiding east_coast for beaches due to monsoon in january.".to_string()]
    );
}

#[tokio::test]
async fn test_december_avoids_two_regions() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(14, "december", &["beach", "history"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(
        plan.avoided_regions,
        vec![Region::EastCoast, Region::CulturalTriangle]
    );
    assert_eq!(stop_names(&plan), vec!["Mirissa", "Unawatuna"]);
}

#[tokio::test]
async fn test_pacing_is_configurable() {
    let harness =
        ScenarioHarness::new().with_config(PlannerConfig::default().with_pacing_days(1));
    let plan = harness.plan(3, "march", &["history", "hiking"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(plan.max_stops, 4);
    assert_eq!(
        stop_names(&plan),
        vec!["Sigiriya", "Dambulla", "Nuwara Eliya", "Ella"]
    );
}

#[tokio::test]
async fn test_each_run_is_independent() {
    let harness = ScenarioHarness::new();
    let first = harness.plan(7, "august", &["beach", "wildlife"]).await;
    let second = harness.plan(7, "march", &["history"]).await;

    assert_ne!(first.run_id, second.run_id);
    assert!(second.avoided_regions.is_empty());
    assert!(second.warnings.is_empty());
    assert_eq!(stop_names(&second), vec!["Sigiriya", "Dambulla"]);
}

#[tokio::test]
async fn test_plan_serializes_to_json() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(7, "august", &["beach"]).await;

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["request"]["month"], "august");
    assert_eq!(json["itinerary"][0]["location"], "Trincomalee");
    assert_eq!(json["itinerary"][0]["stop_number"], 1);
    assert_eq!(json["avoided_regions"][0], "south_west");
}
