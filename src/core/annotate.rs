//! Park annotation for the map renderer
//!
//! Each located park gets a region label, the nearest airports and the
//! nearest other parks. The renderer reads the resulting JSON document; the
//! flat CSV form is for spreadsheets.

use std::io::Write;

use log::{debug, info};
use serde::Serialize;

use crate::core::config::AtlasConfig;
use crate::core::entity::{Entity, Locatable};
use crate::core::error::Result;
use crate::core::geo::GeoPoint;
use crate::core::proximity::{nearest, ProximityQuery, ProximityResult};
use crate::core::region::{Region, RegionClassifier};
use crate::core::stats::Statistics;

/// A park together with everything derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedEntity<'a> {
    pub entity: &'a Entity,
    /// Location every distance was measured from
    pub location: GeoPoint,
    pub region: Region,
    pub nearby_airports: Vec<ProximityResult>,
    pub nearby_parks: Vec<ProximityResult>,
}

/// Wire form of an annotated park
#[derive(Serialize)]
struct AnnotatedRecord<'r> {
    identifier: &'r str,
    name: &'r str,
    country: &'r str,
    states: &'r str,
    designation: &'r str,
    description: &'r str,
    url: &'r str,
    location: GeoPoint,
    region: Region,
    nearby_airports: &'r [ProximityResult],
    nearby_parks: &'r [ProximityResult],
}

impl Serialize for AnnotatedEntity<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AnnotatedRecord {
            identifier: &self.entity.identifier,
            name: &self.entity.name,
            country: &self.entity.country,
            states: &self.entity.states,
            designation: &self.entity.designation,
            description: &self.entity.description,
            url: &self.entity.url,
            location: self.location,
            region: self.region,
            nearby_airports: &self.nearby_airports,
            nearby_parks: &self.nearby_parks,
        }
        .serialize(serializer)
    }
}

/// Annotates parks against a fixed set of parks and airports
#[derive(Debug, Clone)]
pub struct Annotator<'a> {
    parks: &'a [Entity],
    airports: &'a [Entity],
    airport_query: ProximityQuery,
    park_query: ProximityQuery,
    classifier: RegionClassifier,
}

impl<'a> Annotator<'a> {
    /// Create an annotator with the default queries and fallback policy
    pub fn new(parks: &'a [Entity], airports: &'a [Entity]) -> Self {
        Self {
            parks,
            airports,
            airport_query: ProximityQuery::AIRPORTS,
            park_query: ProximityQuery::PARKS,
            classifier: RegionClassifier::default(),
        }
    }

    /// Take queries and fallback policy from a configuration file
    pub fn with_config(self, config: &AtlasConfig) -> Self {
        self.with_airport_query(config.airport_query())
            .with_park_query(config.park_query())
            .with_classifier(config.classifier())
    }

    pub fn with_airport_query(mut self, query: ProximityQuery) -> Self {
        self.airport_query = query;
        self
    }

    pub fn with_park_query(mut self, query: ProximityQuery) -> Self {
        self.park_query = query;
        self
    }

    pub fn with_classifier(mut self, classifier: RegionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &RegionClassifier {
        &self.classifier
    }

    /// Annotate one park, or `None` if it has no location
    ///
    /// The park itself is excluded from its own nearby parks.
    pub fn annotate(&self, park: &'a Entity) -> Option<AnnotatedEntity<'a>> {
        let Some(location) = park.valid_location() else {
            debug!("Skipping '{}': no location", park.identifier);
            return None;
        };

        let nearby_airports = nearest(location, self.airports, &self.airport_query);
        let nearby_parks = nearest(
            location,
            self.parks.iter().filter(|other| !other.is_same_record(park)),
            &self.park_query,
        );

        Some(AnnotatedEntity {
            entity: park,
            location,
            region: self.classifier.classify_entity(park),
            nearby_airports,
            nearby_parks,
        })
    }

    /// Annotate every located park, in input order
    pub fn annotate_all(&self) -> Vec<AnnotatedEntity<'a>> {
        let annotated: Vec<AnnotatedEntity<'a>> =
            self.parks.iter().filter_map(|park| self.annotate(park)).collect();
        info!(
            "Annotated {} of {} parks ({} without location)",
            annotated.len(),
            self.parks.len(),
            self.parks.len() - annotated.len()
        );
        annotated
    }

    /// Annotate every park and attach the summary statistics
    pub fn report(&self) -> AtlasReport<'a> {
        let entities = self.annotate_all();
        let statistics = Statistics::from_annotated(&entities);
        AtlasReport {
            entities,
            statistics,
        }
    }
}

/// Document handed to the map renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasReport<'a> {
    pub entities: Vec<AnnotatedEntity<'a>>,
    pub statistics: Statistics,
}

/// Write the report as pretty-printed JSON
pub fn write_json<W: Write>(mut writer: W, report: &AtlasReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

/// `"Salt Lake City International (273.1 mi); Boise Airport (290.4 mi)"`
pub fn format_nearby(results: &[ProximityResult]) -> String {
    results
        .iter()
        .map(|r| format!("{} ({:.1} mi)", r.name, r.distance_miles))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Serialize)]
struct FlatRecord<'r> {
    #[serde(rename = "Id")]
    identifier: &'r str,
    #[serde(rename = "Name")]
    name: &'r str,
    #[serde(rename = "Country")]
    country: &'r str,
    #[serde(rename = "States")]
    states: &'r str,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Region")]
    region: Region,
    #[serde(rename = "Nearby_Airports")]
    nearby_airports: String,
    #[serde(rename = "Nearby_Parks")]
    nearby_parks: String,
}

/// Write one flat CSV row per annotated park
pub fn write_csv<W: Write>(writer: W, annotated: &[AnnotatedEntity<'_>]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for a in annotated {
        wtr.serialize(FlatRecord {
            identifier: &a.entity.identifier,
            name: &a.entity.name,
            country: &a.entity.country,
            states: &a.entity.states,
            latitude: a.location.latitude(),
            longitude: a.location.longitude(),
            region: a.region,
            nearby_airports: format_nearby(&a.nearby_airports),
            nearby_parks: format_nearby(&a.nearby_parks),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
