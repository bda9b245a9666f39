//! Turns candidate stops into a numbered, paced itinerary.

use crate::config::PlannerConfig;
use crate::facts::{ItineraryItem, PotentialMatch};
use crate::knowledge::Region;
use std::collections::HashSet;

/// Stop budget for a trip: one stop per `pacing_days` days plus one.
pub fn max_stops(duration: u32, pacing_days: u32) -> usize {
    let per_stop = pacing_days.max(1);
    (duration / per_stop + 1).max(1) as usize
}

/// Select, order and number the stops.
///
/// Candidates in an avoided region are dropped. The rest are ranked by
/// priority, with stops in the suggested region pulled forward by
/// `preferred_region_bonus`; ties keep discovery order. The first
/// occurrence of each location name is kept until the stop budget is
/// spent, and the selection is then re-ordered by raw priority so the
/// route reads in travel order.
pub fn build_itinerary(
    candidates: &[PotentialMatch],
    avoided: &[Region],
    suggested: Option<Region>,
    duration: u32,
    config: &PlannerConfig,
) -> Vec<ItineraryItem> {
    let budget = max_stops(duration, config.pacing_days);

    let mut ranked: Vec<&PotentialMatch> = candidates
        .iter()
        .filter(|c| !avoided.contains(&c.region))
        .collect();
    ranked.sort_by_key(|c| {
        let bonus = if Some(c.region) == suggested {
            config.preferred_region_bonus
        } else {
            0
        };
        i64::from(c.priority) - i64::from(bonus)
    });

    let mut seen = HashSet::new();
    let mut selected: Vec<&PotentialMatch> = Vec::with_capacity(budget);
    for candidate in ranked {
        if selected.len() == budget {
            break;
        }
        if seen.insert(candidate.location.as_str()) {
            selected.push(candidate);
        }
    }

    selected.sort_by_key(|c| c.priority);

    selected
        .into_iter()
        .zip(1u32..)
        .map(|(c, stop_number)| ItineraryItem {
            stop_number,
            location: c.location.clone(),
            reason: reason_for(c, suggested),
            description: c.description.clone(),
            region: c.region,
            priority: c.priority,
        })
        .collect()
}

fn reason_for(candidate: &PotentialMatch, suggested: Option<Region>) -> String {
    if Some(candidate.region) == suggested {
        format!("Good {} in {} this month", candidate.kind, candidate.region)
    } else {
        format!("Matches '{}' interest", candidate.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(location: &str, kind: &str, region: Region, priority: i32) -> PotentialMatch {
        PotentialMatch {
            location: location.to_string(),
            kind: kind.to_string(),
            region,
            priority,
            description: String::new(),
        }
    }

    fn names(items: &[ItineraryItem]) -> Vec<&str> {
        items.iter().map(|i| i.location.as_str()).collect()
    }

    #[test]
    fn test_max_stops() {
        assert_eq!(max_stops(7, 2), 4);
        assert_eq!(max_stops(5, 2), 3);
        assert_eq!(max_stops(3, 2), 2);
        assert_eq!(max_stops(1, 2), 1);
        assert_eq!(max_stops(10, 3), 4);
        assert_eq!(max_stops(4, 0), 5);
    }

    #[test]
    fn test_empty_candidates_build_nothing() {
        let config = PlannerConfig::default();
        assert!(build_itinerary(&[], &[], None, 7, &config).is_empty());
    }

    #[test]
    fn test_suggested_region_is_preferred_then_reordered() {
        let config = PlannerConfig::default();
        let candidates = vec![
            candidate("Sigiriya", "history", Region::CulturalTriangle, 1),
            candidate("Dambulla", "history", Region::CulturalTriangle, 2),
            candidate("Arugam Bay", "beach", Region::EastCoast, 7),
            candidate("Trincomalee", "beach", Region::EastCoast, 3),
        ];

        let items = build_itinerary(&candidates, &[], Some(Region::EastCoast), 5, &config);

        // Both beaches outrank Dambulla; the final order is by priority.
        assert_eq!(names(&items), vec!["Sigiriya", "Trincomalee", "Arugam Bay"]);
        assert_eq!(items[1].reason, "Good beach in east_coast this month");
        assert_eq!(items[0].reason, "Matches 'history' interest");
        let numbers: Vec<u32> = items.iter().map(|i| i.stop_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_avoided_regions_are_dropped() {
        let config = PlannerConfig::default();
        let candidates = vec![
            candidate("Mirissa", "beach", Region::SouthWest, 10),
            candidate("Yala", "wildlife", Region::SouthEast, 8),
        ];

        let items = build_itinerary(&candidates, &[Region::SouthWest], None, 7, &config);
        assert_eq!(names(&items), vec!["Yala"]);
    }

    #[test]
    fn test_duplicate_names_kept_once() {
        let config = PlannerConfig::default();
        let candidates = vec![
            candidate("Kandy", "culture", Region::HillCountry, 4),
            candidate("Kandy", "history", Region::HillCountry, 4),
            candidate("Ella", "hiking", Region::HillCountry, 6),
        ];

        let items = build_itinerary(&candidates, &[], None, 7, &config);
        assert_eq!(names(&items), vec!["Kandy", "Ella"]);
        assert_eq!(items[0].reason, "Matches 'culture' interest");
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let config = PlannerConfig::default();
        let candidates = vec![
            candidate("Jaffna", "culture", Region::North, 99),
            candidate("Nallur", "culture", Region::North, 99),
            candidate("Point Pedro", "culture", Region::North, 99),
        ];

        let items = build_itinerary(&candidates, &[], None, 3, &config);
        assert_eq!(names(&items), vec!["Jaffna", "Nallur"]);
    }

    #[test]
    fn test_pacing_changes_budget() {
        let config = PlannerConfig::default().with_pacing_days(5);
        let candidates: Vec<_> = (0..6)
            .map(|i| candidate(&format!("Stop {i}"), "history", Region::North, i))
            .collect();

        assert_eq!(build_itinerary(&candidates, &[], None, 10, &config).len(), 3);
    }
}
