//! The planner's rule catalogue.
//!
//! | Rule                      | Salience | Derives                          |
//! |---------------------------|----------|----------------------------------|
//! | `avoid_region_for_weather`| 100      | avoid recommendation + warning   |
//! | `suggest_good_region`     | 90       | suggest recommendation           |
//! | `detect_unknown_interest` | 50       | `FindInfo`                       |
//! | `collect_candidate_matches`| 10      | `PotentialMatch`                 |
//! | `too_many_stops`          | 0        | pacing warning                   |
//! | `build_itinerary`         | -100     | `ItineraryItem`s                 |
//! | `long_haul_pair`          | -110     | travel-time warning              |
//!
//! The travel-time check reads the finished itinerary, so it only warns
//! about stops the traveller will actually visit.

use crate::config::PlannerConfig;
use crate::engine::{Pattern, Rule};
use crate::facts::{
    Fact, FactKind, Field, FindInfo, Location, PotentialMatch, Recommendation, Warning,
};
use crate::itinerary;
use crate::knowledge::Region;
use std::sync::Arc;

pub const AVOID_SALIENCE: i32 = 100;
pub const SUGGEST_SALIENCE: i32 = 90;
pub const DETECT_SALIENCE: i32 = 50;
pub const MATCH_SALIENCE: i32 = 10;
pub const CONFLICT_SALIENCE: i32 = 0;
pub const BUILD_SALIENCE: i32 = -100;
pub const REVIEW_SALIENCE: i32 = -110;

pub const MANY_STOPS_WARNING: &str =
    "Plan has many stops for a short trip. Consider focusing on one region.";

/// Build the full rule set for a configuration.
pub fn standard_rules(config: &PlannerConfig) -> Vec<Rule> {
    let config = Arc::new(config.clone());
    vec![
        avoid_region_for_weather(config.clone()),
        suggest_good_region(config.clone()),
        detect_unknown_interest(),
        collect_candidate_matches(),
        too_many_stops(config.clone()),
        build_itinerary(config.clone()),
        long_haul_pair(config),
    ]
}

fn request() -> Pattern {
    Pattern::new(FactKind::UserRequest)
}

fn avoided(var: &'static str) -> Pattern {
    Pattern::new(FactKind::Recommendation).bind(Field::AvoidRegion, var)
}

/// A beach trip in a month with bad weather somewhere: steer clear of it.
fn avoid_region_for_weather(config: Arc<PlannerConfig>) -> Rule {
    Rule::named("avoid_region_for_weather")
        .salience(AVOID_SALIENCE)
        .when(
            request()
                .bind(Field::Month, "month")
                .bind(Field::Interests, "interests"),
        )
        .when(
            Pattern::new(FactKind::Weather)
                .bind(Field::BadRegion, "region")
                .bind(Field::Month, "month"),
        )
        .test(move |b| b.list("interests").iter().any(|i| config.is_beach(i)))
        .then(|b, store| {
            let region = b.region("region");
            if store.contains::<Recommendation>(|r| r.avoid_region() == Some(region)) {
                return Vec::new();
            }
            let month = b.month("month");
            vec![
                Recommendation::avoid(region)
                    .with_reason(format!("monsoon in {month}"))
                    .into(),
                Warning::new(format!(
                    "Avoiding {region} for beaches due to monsoon in {month}."
                ))
                .into(),
            ]
        })
}

/// The first beach region that is not avoided becomes the suggestion.
fn suggest_good_region(config: Arc<PlannerConfig>) -> Rule {
    let wants_beach = config.clone();
    Rule::named("suggest_good_region")
        .salience(SUGGEST_SALIENCE)
        .when(request().bind(Field::Interests, "interests"))
        .test(move |b| b.list("interests").iter().any(|i| wants_beach.is_beach(i)))
        .when(
            Pattern::new(FactKind::Location)
                .bind(Field::Kind, "kind")
                .bind(Field::Region, "region"),
        )
        .test(move |b| config.is_beach(b.text("kind")))
        .unless(avoided("region"))
        .then(|b, store| {
            if store.contains::<Recommendation>(|r| r.suggest_region().is_some()) {
                return Vec::new();
            }
            vec![Recommendation::suggest(b.region("region"))
                .with_reason("no weather hazard this month")
                .into()]
        })
}

/// Interests no known place serves are handed to the knowledge agent.
fn detect_unknown_interest() -> Rule {
    Rule::named("detect_unknown_interest")
        .salience(DETECT_SALIENCE)
        .when(request().bind(Field::Interests, "interests"))
        .then(|b, store| {
            b.list("interests")
                .iter()
                .filter(|interest| !store.contains::<Location>(|l| &l.kind == *interest))
                .filter(|interest| !store.contains::<FindInfo>(|f| &f.interest == *interest))
                .map(|interest| {
                    Fact::from(FindInfo {
                        interest: interest.clone(),
                    })
                })
                .collect()
        })
}

fn collect_candidate_matches() -> Rule {
    Rule::named("collect_candidate_matches")
        .salience(MATCH_SALIENCE)
        .when(request().bind(Field::Interests, "interests"))
        .when(
            Pattern::new(FactKind::Location)
                .bind(Field::Name, "name")
                .bind(Field::Kind, "kind")
                .bind(Field::Region, "region")
                .bind(Field::Priority, "priority")
                .bind(Field::Description, "description"),
        )
        .test(|b| b.list("interests").iter().any(|i| i == b.text("kind")))
        .unless(avoided("region"))
        .then(|b, _| {
            let priority = i32::try_from(b.int("priority")).unwrap_or(i32::MAX);
            vec![PotentialMatch {
                location: b.text("name").to_string(),
                kind: b.text("kind").to_string(),
                region: b.region("region"),
                priority,
                description: b.text("description").to_string(),
            }
            .into()]
        })
}

/// Two configured far-apart places both in the itinerary of a short trip.
fn long_haul_pair(config: Arc<PlannerConfig>) -> Rule {
    let threshold = config.long_haul_max_days;
    let max_days = i64::from(threshold);
    let stop = |name, region| {
        Pattern::new(FactKind::ItineraryItem)
            .bind(Field::Location, name)
            .bind(Field::Region, region)
    };
    Rule::named("long_haul_pair")
        .salience(REVIEW_SALIENCE)
        .when(request().bind(Field::Duration, "duration"))
        .test(move |b| b.int("duration") < max_days)
        .when(stop("from", "from_region"))
        .when(stop("to", "to_region"))
        .test(move |b| {
            let (from, to) = (b.text("from"), b.text("to"));
            config
                .long_haul_pairs
                .iter()
                .any(|pair| pair.from == from && pair.to == to)
        })
        .then(move |b, store| {
            let message = long_haul_message(
                b.text("from"),
                b.region("from_region"),
                b.text("to"),
                b.region("to_region"),
                threshold,
            );
            if store.contains::<Warning>(|w| w.message == message) {
                return Vec::new();
            }
            vec![Warning::new(message).into()]
        })
}

pub fn long_haul_message(from: &str, from_region: Region, to: &str, to_region: Region, days: u32) -> String {
    format!(
        "High travel time between {} ({from}) and {} ({to}). Difficult in < {days} days.",
        from_region.label(),
        to_region.label(),
    )
}

/// Three distinct candidate stops on a very short trip.
fn too_many_stops(config: Arc<PlannerConfig>) -> Rule {
    let max_days = i64::from(config.crowded_trip_max_days);
    let stop = |var| Pattern::new(FactKind::PotentialMatch).bind(Field::Location, var);
    Rule::named("too_many_stops")
        .salience(CONFLICT_SALIENCE)
        .when(request().bind(Field::Duration, "duration"))
        .test(move |b| b.int("duration") < max_days)
        .when(stop("l1"))
        .when(stop("l2"))
        .test(|b| b.text("l1") < b.text("l2"))
        .when(stop("l3"))
        .test(|b| b.text("l2") < b.text("l3"))
        .then(|_, store| {
            if store.contains::<Warning>(|w| w.message == MANY_STOPS_WARNING) {
                return Vec::new();
            }
            vec![Warning::new(MANY_STOPS_WARNING).into()]
        })
}

/// Fires once all lookups are in and there is something to plan.
fn build_itinerary(config: Arc<PlannerConfig>) -> Rule {
    Rule::named("build_itinerary")
        .salience(BUILD_SALIENCE)
        .when(request().bind(Field::Duration, "duration"))
        .exists(Pattern::new(FactKind::PotentialMatch))
        .exists(Pattern::new(FactKind::GapsResolved))
        .then(move |b, store| {
            let duration = u32::try_from(b.int("duration")).unwrap_or(u32::MAX);
            let candidates: Vec<PotentialMatch> =
                store.of_type::<PotentialMatch>().cloned().collect();
            itinerary::build_itinerary(
                &candidates,
                &store.avoided_regions(),
                store.suggested_region(),
                duration,
                &config,
            )
            .into_iter()
            .map(Fact::from)
            .collect()
        })
}
