//! Nearest-neighbour selection within a radius
//!
//! A linear scan over the candidates: the datasets hold a few hundred rows,
//! so no spatial index is involved.

use serde::{Deserialize, Serialize};

use crate::core::entity::Locatable;
use crate::core::geo::{distance_miles, GeoPoint};

/// Radius and result cap for a proximity query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityQuery {
    pub max_radius_miles: f64,
    pub top_n: usize,
}

impl ProximityQuery {
    /// Airports near a park
    pub const AIRPORTS: ProximityQuery = ProximityQuery {
        max_radius_miles: 200.0,
        top_n: 5,
    };

    /// Other parks near a park
    pub const PARKS: ProximityQuery = ProximityQuery {
        max_radius_miles: 300.0,
        top_n: 5,
    };

    pub fn new(max_radius_miles: f64, top_n: usize) -> Self {
        Self {
            max_radius_miles,
            top_n,
        }
    }
}

/// One candidate found near the target
///
/// Holds copies of the candidate's identity, not a reference to the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    pub identifier: String,
    pub name: String,
    pub location: GeoPoint,
    pub distance_miles: f64,
}

/// Return the nearest candidates within `query.max_radius_miles` of `target`
///
/// Candidates without a location, or placed at the `(0, 0)` marker, are
/// skipped; a marker target matches nothing. Results are sorted by ascending
/// distance; equal distances keep their input order. At most `query.top_n`
/// results are returned.
pub fn nearest<'a, T, I>(target: GeoPoint, candidates: I, query: &ProximityQuery) -> Vec<ProximityResult>
where
    T: Locatable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if query.top_n == 0 || target.is_sentinel() {
        return Vec::new();
    }

    let mut results: Vec<ProximityResult> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let location = candidate.valid_location()?;
            let distance = distance_miles(target, location);
            (distance <= query.max_radius_miles).then(|| ProximityResult {
                identifier: candidate.identifier().to_string(),
                name: candidate.name().to_string(),
                location,
                distance_miles: distance,
            })
        })
        .collect();

    // sort_by is stable, which keeps input order for ties
    results.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    results.truncate(query.top_n);
    results
}
