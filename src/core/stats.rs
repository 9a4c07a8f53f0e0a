//! Summary counts over a set of parks

use serde::{Deserialize, Serialize};

use crate::core::annotate::AnnotatedEntity;
use crate::core::dataset::CANADA;
use crate::core::entity::{Entity, Locatable};
use crate::core::region::{Region, RegionClassifier};

/// How many entries the state and province rankings keep
pub const TOP_RANKING: usize = 10;

/// A label with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

/// Insertion-ordered counter
#[derive(Debug, Default)]
struct Tally {
    entries: Vec<CountEntry>,
}

impl Tally {
    fn add(&mut self, name: &str) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(CountEntry {
                name: name.to_string(),
                count: 1,
            }),
        }
    }

    /// Entries by descending count, ties in first-seen order
    fn ranked(mut self, limit: Option<usize>) -> Vec<CountEntry> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(limit) = limit {
            self.entries.truncate(limit);
        }
        self.entries
    }
}

/// Totals shown next to the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub by_country: Vec<CountEntry>,
    /// One entry per region, in [`Region::ALL`] order
    pub by_region: Vec<CountEntry>,
    pub top_states: Vec<CountEntry>,
    pub top_provinces: Vec<CountEntry>,
}

impl Statistics {
    /// Count located parks, classifying each with `classifier`
    ///
    /// Parks without a location are left out, matching what gets annotated.
    pub fn compute(parks: &[Entity], classifier: &RegionClassifier) -> Self {
        Self::collect(
            parks
                .iter()
                .filter(|park| park.valid_location().is_some())
                .map(|park| (park, classifier.classify_entity(park))),
        )
    }

    /// Count already annotated parks
    pub fn from_annotated(annotated: &[AnnotatedEntity<'_>]) -> Self {
        Self::collect(annotated.iter().map(|a| (a.entity, a.region)))
    }

    fn collect<'a>(parks: impl Iterator<Item = (&'a Entity, Region)>) -> Self {
        let mut total = 0;
        let mut countries = Tally::default();
        let mut states = Tally::default();
        let mut provinces = Tally::default();
        let mut regions = vec![0usize; Region::ALL.len()];

        for (park, region) in parks {
            total += 1;
            countries.add(&park.country);
            if let Some(slot) = Region::ALL.iter().position(|r| *r == region) {
                regions[slot] += 1;
            }

            let tally = if park.country == CANADA {
                &mut provinces
            } else {
                &mut states
            };
            for code in park.state_codes() {
                tally.add(code);
            }
        }

        Self {
            total,
            by_country: countries.ranked(None),
            by_region: Region::ALL
                .iter()
                .zip(regions)
                .map(|(region, count)| CountEntry {
                    name: region.to_string(),
                    count,
                })
                .collect(),
            top_states: states.ranked(Some(TOP_RANKING)),
            top_provinces: provinces.ranked(Some(TOP_RANKING)),
        }
    }

    /// Count for one region
    pub fn region_count(&self, region: Region) -> usize {
        self.by_region
            .iter()
            .find(|e| e.name == region.as_str())
            .map_or(0, |e| e.count)
    }

    /// Count for one country
    pub fn country_count(&self, country: &str) -> usize {
        self.by_country
            .iter()
            .find(|e| e.name == country)
            .map_or(0, |e| e.count)
    }
}
