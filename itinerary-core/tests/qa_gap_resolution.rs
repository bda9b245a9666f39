//! Unknown interests resolved (or not) through the knowledge agent.

use itinerary_core::testing::{assert_plan_invariants, stop_names, MockAgent, ScenarioHarness};
use itinerary_core::{LookupOutcome, Location, PlannerConfig, Region, SeedKnowledge};
use std::time::Duration;

#[tokio::test]
async fn test_unknown_interest_is_looked_up_and_planned() {
    let agent = MockAgent::new().with_place("meditation", "Nilambe", Region::North);
    let harness = ScenarioHarness::with_agent(agent);

    let plan = harness.plan(7, "march", &["history", "meditation"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(harness.agent.calls(), vec!["meditation"]);
    assert_eq!(plan.unknown_interests().collect::<Vec<_>>(), vec!["meditation"]);
    assert_eq!(
        plan.lookups[0].outcome,
        LookupOutcome::Found {
            name: "Nilambe".to_string(),
            region: Region::North,
        }
    );
    assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla", "Nilambe"]);

    let found = &plan.itinerary[2];
    assert_eq!(found.priority, 99);
    assert_eq!(found.region, Region::North);
    assert_eq!(found.reason, "Matches 'meditation' interest");
    assert_eq!(found.description, PlannerConfig::default().agent_description);
}

#[tokio::test]
async fn test_known_interests_skip_the_agent() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(7, "august", &["beach", "wildlife"]).await;

    assert!(plan.lookups.is_empty());
    assert!(harness.agent.calls().is_empty());
    assert_eq!(plan.phase_two.fired, 1);
}

#[tokio::test]
async fn test_not_found_leaves_plan_unchanged() {
    let harness = ScenarioHarness::new();
    let plan = harness.plan(7, "march", &["history", "meditation"]).await;

    assert_eq!(plan.lookups[0].outcome, LookupOutcome::NotFound);
    assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla"]);
}

#[tokio::test]
async fn test_agent_failure_does_not_block_the_plan() {
    let agent = MockAgent::new()
        .with_failure("meditation", "not json")
        .with_place("surfing", "Hikkaduwa", Region::SouthWest);
    let harness = ScenarioHarness::with_agent(agent);

    let plan = harness.plan(7, "march", &["history", "meditation", "surfing"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(harness.agent.calls(), vec!["meditation", "surfing"]);
    assert!(matches!(
        &plan.lookups[0].outcome,
        LookupOutcome::Failed { error } if error.contains("not json")
    ));
    assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla", "Hikkaduwa"]);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_agent_times_out() {
    let agent = MockAgent::new().with_hang("meditation");
    let harness = ScenarioHarness::with_agent(agent)
        .with_config(PlannerConfig::default().with_lookup_timeout(Duration::from_secs(5)));

    let plan = harness.plan(7, "march", &["history", "meditation"]).await;

    assert!(matches!(
        &plan.lookups[0].outcome,
        LookupOutcome::Failed { error } if error.contains("timed out")
    ));
    assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla"]);
}

#[tokio::test]
async fn test_agent_place_in_avoided_region_is_dropped() {
    // The agent's answer for surfing lands in the monsoon region.
    let agent = MockAgent::new().with_place("surfing", "Hikkaduwa", Region::SouthWest);
    let harness = ScenarioHarness::with_agent(agent);

    let plan = harness.plan(7, "july", &["surfing", "wildlife"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(plan.avoided_regions, vec![Region::SouthWest]);
    assert!(!stop_names(&plan).contains(&"Hikkaduwa"));
    assert_eq!(stop_names(&plan), vec!["Yala", "Udawalawe"]);
}

#[tokio::test]
async fn test_only_agent_places_still_build_an_itinerary() {
    let knowledge = SeedKnowledge {
        locations: vec![Location::new("Jaffna Fort", "history", Region::North).with_priority(1)],
        weather: Vec::new(),
    };
    let agent = MockAgent::new().with_place("temples", "Nallur Kovil", Region::North);
    let harness = ScenarioHarness::with_agent(agent).with_knowledge(knowledge);

    let plan = harness.plan(2, "may", &["temples"]).await;

    assert_plan_invariants(&plan);
    assert_eq!(stop_names(&plan), vec!["Nallur Kovil"]);
}
