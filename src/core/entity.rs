//! Dataset records
//!
//! Entities are loaded once from tabular sources and never mutated; every
//! annotation is derived from them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::geo::GeoPoint;

/// What kind of place a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Park,
    Airport,
    Temple,
    Site,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Park => "park",
            EntityKind::Airport => "airport",
            EntityKind::Temple => "temple",
            EntityKind::Site => "site",
        };
        f.write_str(name)
    }
}

/// Anything with a stable identity and an optional position
pub trait Locatable {
    fn identifier(&self) -> &str;
    fn name(&self) -> &str;
    fn location(&self) -> Option<GeoPoint>;

    /// The location, unless it is missing or the `(0, 0)` marker
    fn valid_location(&self) -> Option<GeoPoint> {
        self.location().filter(|p| !p.is_sentinel())
    }
}

/// Split a comma-joined list of state or province codes
///
/// Codes are trimmed; empty entries are skipped.
pub fn split_codes(states: &str) -> impl Iterator<Item = &str> {
    states
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
}

/// Reads a location that a renderer or an older export may have written
/// with the `(0, 0)` marker or out-of-range values; those become `None`.
fn lenient_location<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<GeoPoint>, D::Error> {
    #[derive(Deserialize)]
    struct Coordinates {
        latitude: f64,
        longitude: f64,
    }

    let raw = Option::<Coordinates>::deserialize(deserializer)?;
    Ok(raw.and_then(|c| GeoPoint::checked(c.latitude, c.longitude)))
}

/// A park, airport, temple or heritage site
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Unique within its source table (park code, IATA code, ...)
    pub identifier: String,
    pub name: String,
    pub kind: EntityKind,
    /// `None` when the source row had no usable coordinates
    #[serde(deserialize_with = "lenient_location")]
    pub location: Option<GeoPoint>,
    /// State or province codes, comma-joined for multi-state entities
    pub states: String,
    pub country: String,
    pub designation: String,
    pub city: String,
    pub description: String,
    pub url: String,
}

impl Entity {
    /// Individual state/province codes, trimmed, empty entries skipped
    pub fn state_codes(&self) -> impl Iterator<Item = &str> {
        split_codes(&self.states)
    }

    /// Whether two records describe the same row of the same table
    ///
    /// Identifiers are only unique within a table, so the country
    /// disambiguates parks such as the two "Glacier National Park" entries.
    pub fn is_same_record(&self, other: &Entity) -> bool {
        self.identifier == other.identifier && self.country == other.country
    }
}

impl Locatable for Entity {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<GeoPoint> {
        self.location
    }
}
