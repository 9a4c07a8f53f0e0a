//! Region classification for parks
//!
//! A fixed, priority-ordered rule table over the entity's country and state
//! codes. The tables are not exhaustive: territories and full state names
//! fall through to the configured [`RegionFallback`].

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::entity::{split_codes, Entity};
use crate::core::error::Error;

const CANADA: &str = "Canada";

const WEST_STATES: &[&str] = &["CA", "OR", "WA", "NV", "ID", "MT", "WY", "UT", "CO", "AZ", "NM"];
const MIDWEST_STATES: &[&str] = &[
    "ND", "SD", "NE", "KS", "MN", "IA", "MO", "WI", "IL", "MI", "IN", "OH",
];
const SOUTH_STATES: &[&str] = &[
    "TX", "OK", "AR", "LA", "MS", "AL", "TN", "KY", "WV", "VA", "NC", "SC", "GA", "FL",
];
const NORTHEAST_STATES: &[&str] = &["ME", "NH", "VT", "MA", "RI", "CT", "NY", "NJ", "PA", "MD", "DE"];

/// Display region of a park
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    West,
    Midwest,
    South,
    Northeast,
    Alaska,
    Hawaii,
    Canada,
    Other,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::West,
        Region::Midwest,
        Region::South,
        Region::Northeast,
        Region::Alaska,
        Region::Hawaii,
        Region::Canada,
        Region::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::West => "West",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::Northeast => "Northeast",
            Region::Alaska => "Alaska",
            Region::Hawaii => "Hawaii",
            Region::Canada => "Canada",
            Region::Other => "Other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown region '{s}'")))
    }
}

/// Region assigned when no rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFallback {
    /// Unmatched parks are labelled `West`, as the old map page did
    West,
    #[default]
    Other,
}

impl RegionFallback {
    pub fn region(&self) -> Region {
        match self {
            RegionFallback::West => Region::West,
            RegionFallback::Other => Region::Other,
        }
    }
}

impl FromStr for RegionFallback {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "west" => Ok(RegionFallback::West),
            "other" => Ok(RegionFallback::Other),
            _ => Err(Error::InvalidInput(format!(
                "Region fallback must be 'west' or 'other', got '{s}'"
            ))),
        }
    }
}

/// Rule table plus fallback policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionClassifier {
    pub fallback: RegionFallback,
}

impl RegionClassifier {
    pub fn new(fallback: RegionFallback) -> Self {
        Self { fallback }
    }

    /// Classify from a country name and a comma-joined list of state codes
    pub fn classify(&self, country: &str, states: &str) -> Region {
        if country == CANADA {
            return Region::Canada;
        }

        let codes: Vec<&str> = split_codes(states).collect();
        let any_of = |table: &[&str]| codes.iter().any(|code| table.iter().any(|t| t == code));

        if codes.contains(&"AK") {
            Region::Alaska
        } else if codes.contains(&"HI") {
            Region::Hawaii
        } else if any_of(WEST_STATES) {
            Region::West
        } else if any_of(MIDWEST_STATES) {
            Region::Midwest
        } else if any_of(SOUTH_STATES) {
            Region::South
        } else if any_of(NORTHEAST_STATES) {
            Region::Northeast
        } else {
            debug!(
                "No region rule matches states '{}' ({}), using {}",
                states,
                country,
                self.fallback.region()
            );
            self.fallback.region()
        }
    }

    pub fn classify_entity(&self, entity: &Entity) -> Region {
        self.classify(&entity.country, &entity.states)
    }
}

/// Classify an entity with the default fallback policy
pub fn classify_region(entity: &Entity) -> Region {
    RegionClassifier::default().classify_entity(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn park(country: &str, states: &str) -> Entity {
        Entity {
            identifier: "test".to_string(),
            name: "Test Park".to_string(),
            country: country.to_string(),
            states: states.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_canada_wins_over_states() {
        assert_eq!(classify_region(&park("Canada", "AK")), Region::Canada);
        assert_eq!(classify_region(&park("Canada", "")), Region::Canada);
    }

    #[test]
    fn test_alaska_and_hawaii_take_priority() {
        assert_eq!(classify_region(&park("United States", "AK, CA")), Region::Alaska);
        assert_eq!(classify_region(&park("United States", "CA,HI")), Region::Hawaii);
        assert_eq!(classify_region(&park("United States", "HI,AK")), Region::Alaska);
    }

    #[test]
    fn test_table_order() {
        assert_eq!(classify_region(&park("United States", "WY,MT,ID")), Region::West);
        assert_eq!(classify_region(&park("United States", "OH")), Region::Midwest);
        assert_eq!(classify_region(&park("United States", "TN,NC")), Region::South);
        assert_eq!(classify_region(&park("United States", "ME")), Region::Northeast);
        // West is checked before South
        assert_eq!(classify_region(&park("United States", "TX, NM")), Region::West);
        // Midwest is checked before Northeast
        assert_eq!(classify_region(&park("United States", "PA,OH")), Region::Midwest);
    }

    #[test]
    fn test_fallback_policy() {
        let full_names = park("United States", "Wyoming, Montana, Idaho");
        assert_eq!(classify_region(&full_names), Region::Other);
        assert_eq!(
            RegionClassifier::new(RegionFallback::West).classify_entity(&full_names),
            Region::West
        );
        assert_eq!(classify_region(&park("United States", "VI")), Region::Other);
        assert_eq!(classify_region(&park("United States", "")), Region::Other);
    }

    #[test]
    fn test_codes_split_like_entity_state_codes() {
        let entity = park("United States", " , ME ,, OH ");
        let codes: Vec<&str> = entity.state_codes().collect();
        assert_eq!(codes, vec!["ME", "OH"]);
        assert_eq!(classify_region(&entity), Region::Midwest);
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        assert_eq!(classify_region(&park("United States", "ak")), Region::Other);
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("midwest".parse::<Region>().unwrap(), Region::Midwest);
        assert_eq!(" Canada ".parse::<Region>().unwrap(), Region::Canada);
        assert!("Atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn test_fallback_from_str() {
        assert_eq!("WEST".parse::<RegionFallback>().unwrap(), RegionFallback::West);
        assert_eq!("other".parse::<RegionFallback>().unwrap(), RegionFallback::Other);
        assert!("east".parse::<RegionFallback>().is_err());
    }
}
