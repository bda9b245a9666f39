//! Seed knowledge: regions, months, places and seasonal weather.
//!
//! The built-in set covers Sri Lanka. A replacement set can be loaded
//! from JSON with [`SeedKnowledge::load`].

use crate::facts::{Fact, Location, Weather};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;

/// Errors from loading seed knowledge.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid knowledge: {0}")]
    Invalid(String),
}

/// Error for a region or month name outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("unknown month '{0}'")]
    UnknownMonth(String),
}

/// The fixed set of travel regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    CulturalTriangle,
    HillCountry,
    SouthEast,
    South,
    SouthWest,
    EastCoast,
    North,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::CulturalTriangle,
        Region::HillCountry,
        Region::SouthEast,
        Region::South,
        Region::SouthWest,
        Region::EastCoast,
        Region::North,
    ];

    /// The snake_case identifier used in facts, prompts and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::CulturalTriangle => "cultural_triangle",
            Region::HillCountry => "hill_country",
            Region::SouthEast => "south_east",
            Region::South => "south",
            Region::SouthWest => "south_west",
            Region::EastCoast => "east_coast",
            Region::North => "north",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Region::CulturalTriangle => "Cultural Triangle",
            Region::HillCountry => "Hill Country",
            Region::SouthEast => "South East",
            Region::South => "South",
            Region::SouthWest => "South West",
            Region::EastCoast => "East Coast",
            Region::North => "North",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = VocabularyError;

    /// Accepts the identifier in any case, with spaces or hyphens for underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase().replace([' ', '-'], "_");
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == slug)
            .ok_or_else(|| VocabularyError::UnknownRegion(s.to_string()))
    }
}

/// Calendar month, keyed by its lower-cased English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }

    /// Capitalized name for display.
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| VocabularyError::UnknownMonth(s.to_string()))
    }
}

/// The initial fact set asserted at engine reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedKnowledge {
    pub locations: Vec<Location>,
    #[serde(default)]
    pub weather: Vec<Weather>,
}

impl SeedKnowledge {
    /// Built-in Sri Lanka knowledge base.
    ///
    /// Priorities follow a loop from the cultural triangle through the
    /// east coast and hills down to the south-west beaches.
    pub fn sri_lanka() -> Self {
        let place = |name: &str, kind: &str, region, priority, description: &str| {
            Location::new(name, kind, region)
                .with_priority(priority)
                .with_description(description)
        };

        let locations = vec![
            place("Sigiriya", "history", Region::CulturalTriangle, 1,
                "Fifth-century rock fortress rising above the central plains."),
            place("Dambulla", "history", Region::CulturalTriangle, 2,
                "Cave temples filled with Buddhist murals and statues."),
            place("Kandy", "culture", Region::HillCountry, 4,
                "Lakeside royal capital and home of the Temple of the Tooth."),
            place("Ella", "hiking", Region::HillCountry, 6,
                "Ridge walks, Little Adam's Peak and the Nine Arch Bridge."),
            place("Nuwara Eliya", "hiking", Region::HillCountry, 5,
                "Tea estates and cool highland trails."),
            place("Yala", "wildlife", Region::SouthEast, 8,
                "Leopards, elephants and sloth bears on safari."),
            place("Udawalawe", "wildlife", Region::South, 9,
                "Reliable elephant herds around the reservoir."),
            place("Mirissa", "beach", Region::SouthWest, 10,
                "Palm-lined bay known for whale watching."),
            place("Unawatuna", "beach", Region::SouthWest, 11,
                "Calm swimming beach near the Galle fort."),
            place("Arugam Bay", "beach", Region::EastCoast, 7,
                "Laid-back surf town on the south-east coast."),
            place("Trincomalee", "beach", Region::EastCoast, 3,
                "Sheltered bays and coral reefs on the north-east coast."),
        ];

        let weather = vec![
            // south-west monsoon
            Weather::new(Region::SouthWest, Month::June),
            Weather::new(Region::SouthWest, Month::July),
            Weather::new(Region::SouthWest, Month::August),
            // north-east monsoon
            Weather::new(Region::EastCoast, Month::December),
            Weather::new(Region::EastCoast, Month::January),
            Weather::new(Region::CulturalTriangle, Month::December),
        ];

        Self { locations, weather }
    }

    /// Parse and validate a JSON knowledge document.
    pub fn from_json(json: &str) -> Result<Self, KnowledgeError> {
        let knowledge: SeedKnowledge = serde_json::from_str(json)?;
        knowledge.validate()?;
        Ok(knowledge.normalized())
    }

    /// Load a JSON knowledge document from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let json = fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Check that every location is usable as a rule match target.
    pub fn validate(&self) -> Result<(), KnowledgeError> {
        if self.locations.is_empty() {
            return Err(KnowledgeError::Invalid("no locations".to_string()));
        }
        for location in &self.locations {
            if location.name.trim().is_empty() {
                return Err(KnowledgeError::Invalid("location with empty name".to_string()));
            }
            if location.kind.trim().is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "location '{}' has no type",
                    location.name
                )));
            }
        }
        Ok(())
    }

    /// Interest tags are matched against lower-cased user input.
    fn normalized(mut self) -> Self {
        for location in &mut self.locations {
            location.kind = location.kind.trim().to_lowercase();
        }
        self
    }

    /// All known interest tags, in first-seen order.
    pub fn interest_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for location in &self.locations {
            if !tags.contains(&location.kind.as_str()) {
                tags.push(&location.kind);
            }
        }
        tags
    }

    /// The facts to assert at reset: locations first, then weather.
    pub fn facts(&self) -> Vec<Fact> {
        self.locations
            .iter()
            .cloned()
            .map(Fact::from)
            .chain(self.weather.iter().cloned().map(Fact::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parse() {
        assert_eq!("south_west".parse::<Region>().unwrap(), Region::SouthWest);
        assert_eq!("Hill Country".parse::<Region>().unwrap(), Region::HillCountry);
        assert_eq!("east-coast".parse::<Region>().unwrap(), Region::EastCoast);
        assert!(matches!(
            "atlantis".parse::<Region>(),
            Err(VocabularyError::UnknownRegion(_))
        ));
    }

    #[test]
    fn test_month_parse_and_label() {
        assert_eq!(" August ".parse::<Month>().unwrap(), Month::August);
        assert_eq!(Month::August.label(), "August");
        assert!("augst".parse::<Month>().is_err());
    }

    #[test]
    fn test_region_serde_uses_identifier() {
        let json = serde_json::to_string(&Region::CulturalTriangle).unwrap();
        assert_eq!(json, "\"cultural_triangle\"");
    }

    #[test]
    fn test_builtin_knowledge() {
        let seed = SeedKnowledge::sri_lanka();
        seed.validate().unwrap();
        assert_eq!(seed.locations.len(), 11);
        assert_eq!(
            seed.interest_tags(),
            vec!["history", "culture", "hiking", "wildlife", "beach"]
        );
        assert_eq!(seed.facts().len(), 17);
        assert!(seed
            .weather
            .iter()
            .any(|w| w.bad_region == Region::SouthWest && w.month == Month::August));
    }

    #[test]
    fn test_from_json() {
        let seed = SeedKnowledge::from_json(
            r#"{
                "locations": [
                    {"name": "Jaffna", "kind": "Culture", "region": "north", "priority": 2}
                ],
                "weather": [{"bad_region": "north", "month": "october"}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.locations[0].kind, "culture");
        assert_eq!(seed.locations[0].region, Region::North);
        assert_eq!(seed.weather[0].month, Month::October);
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        let unknown_region =
            r#"{"locations": [{"name": "X", "kind": "beach", "region": "mars"}]}"#;
        assert!(matches!(
            SeedKnowledge::from_json(unknown_region),
            Err(KnowledgeError::Json(_))
        ));

        let no_kind = r#"{"locations": [{"name": "X", "kind": " ", "region": "north"}]}"#;
        assert!(matches!(
            SeedKnowledge::from_json(no_kind),
            Err(KnowledgeError::Invalid(_))
        ));
    }
}
