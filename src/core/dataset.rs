//! CSV loading and writing for entity tables
//!
//! The source tables were assembled by hand over time and do not agree on
//! column names: US parks use `Park_Code`/`States`, Canadian parks use
//! `Province`, airports use `IATA`/`State`. Every variant maps onto
//! [`Entity`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::error::{Error, Result};
use crate::core::geo::GeoPoint;

/// Default country of the US park and airport tables
pub const UNITED_STATES: &str = "United States";

/// Default country of the Canadian park table
pub const CANADA: &str = "Canada";

/// Country of the temple and heritage site tables
pub const NEPAL: &str = "Nepal";

/// Reference tables compiled into the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTable {
    /// Major US and Canadian airports
    MajorAirports,
    /// Canadian national parks and park reserves
    CanadianParks,
    /// Temples of Nepal outside the Kathmandu Valley
    NepalTemples,
    /// UNESCO World Heritage Sites in Nepal
    NepalUnescoSites,
}

impl BuiltinTable {
    pub const ALL: [BuiltinTable; 4] = [
        BuiltinTable::MajorAirports,
        BuiltinTable::CanadianParks,
        BuiltinTable::NepalTemples,
        BuiltinTable::NepalUnescoSites,
    ];

    /// The table as CSV text, in the column layout it was assembled with
    pub fn csv(self) -> &'static str {
        match self {
            BuiltinTable::MajorAirports => include_str!("../../data/major_airports.csv"),
            BuiltinTable::CanadianParks => include_str!("../../data/canadian_parks.csv"),
            BuiltinTable::NepalTemples => include_str!("../../data/nepal_temples.csv"),
            BuiltinTable::NepalUnescoSites => include_str!("../../data/nepal_unesco_sites.csv"),
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            BuiltinTable::MajorAirports => EntityKind::Airport,
            BuiltinTable::CanadianParks => EntityKind::Park,
            BuiltinTable::NepalTemples => EntityKind::Temple,
            BuiltinTable::NepalUnescoSites => EntityKind::Site,
        }
    }

    /// Country for rows that do not name one
    pub fn default_country(self) -> &'static str {
        match self {
            BuiltinTable::MajorAirports => UNITED_STATES,
            BuiltinTable::CanadianParks => CANADA,
            BuiltinTable::NepalTemples | BuiltinTable::NepalUnescoSites => NEPAL,
        }
    }

    /// File name used when the table is written out
    pub fn file_name(self) -> &'static str {
        match self {
            BuiltinTable::MajorAirports => "major_airports.csv",
            BuiltinTable::CanadianParks => "canadian_parks.csv",
            BuiltinTable::NepalTemples => "nepal_temples.csv",
            BuiltinTable::NepalUnescoSites => "nepal_unesco_sites.csv",
        }
    }

    /// Parse the table into entities
    pub fn load(self) -> Result<Vec<Entity>> {
        let mut entities = read_csv(self.csv().as_bytes(), self.kind(), self.default_country())?;
        if self == BuiltinTable::CanadianParks {
            describe_canadian_parks(&mut entities);
        }
        debug!("Loaded {} rows from the bundled {}", entities.len(), self.file_name());
        Ok(entities)
    }
}

/// One row as it appears in any of the source tables
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "Id", alias = "Park_Code", alias = "IATA", alias = "Code", default)]
    identifier: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Latitude", default)]
    latitude: Option<String>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<String>,
    #[serde(rename = "States", alias = "Province", alias = "State", default)]
    states: Option<String>,
    #[serde(rename = "Country", default)]
    country: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "Designation", default)]
    designation: Option<String>,
    #[serde(rename = "City", default)]
    city: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawRecord {
    fn into_entity(self, kind: EntityKind, default_country: &str) -> Option<Entity> {
        let name = non_empty(self.name);
        let identifier = non_empty(self.identifier).or_else(|| name.clone())?;

        let location = match (self.latitude.as_deref(), self.longitude.as_deref()) {
            (Some(lat), Some(lon)) => GeoPoint::parse(lat, lon),
            _ => None,
        };
        if location.is_none() {
            debug!("No usable coordinates for '{identifier}'");
        }

        Some(Entity {
            name: name.unwrap_or_else(|| identifier.clone()),
            identifier,
            kind,
            location,
            states: non_empty(self.states).unwrap_or_default(),
            country: non_empty(self.country).unwrap_or_else(|| default_country.to_string()),
            designation: non_empty(self.designation).unwrap_or_default(),
            city: non_empty(self.city).unwrap_or_default(),
            description: non_empty(self.description).unwrap_or_default(),
            url: non_empty(self.url).unwrap_or_default(),
        })
    }
}

/// Read entities from CSV
///
/// Rows without an identifier or name are skipped, as are rows whose fields
/// cannot be decoded. Coordinates that are missing, unparseable or the
/// `0,0` sentinel load as an absent location.
pub fn read_csv<R: Read>(reader: R, kind: EntityKind, default_country: &str) -> Result<Vec<Entity>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entities = Vec::new();
    for (index, row) in rdr.deserialize::<RawRecord>().enumerate() {
        let record = match row {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                warn!("Skipping row {}: {e}", index + 2);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match record.into_entity(kind, default_country) {
            Some(entity) => entities.push(entity),
            None => debug!("Skipping row {} without identifier or name", index + 2),
        }
    }

    Ok(entities)
}

/// Load entities from a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P, kind: EntityKind, default_country: &str) -> Result<Vec<Entity>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot open {}: {e}", path.display()),
        ))
    })?;

    let entities = read_csv(file, kind, default_country)?;
    let located = entities.iter().filter(|e| e.location.is_some()).count();
    info!(
        "Loaded {} {kind} records from {} ({} with coordinates)",
        entities.len(),
        path.display(),
        located
    );
    Ok(entities)
}

/// Load the US national parks table
pub fn load_us_parks<P: AsRef<Path>>(path: P) -> Result<Vec<Entity>> {
    load_csv(path, EntityKind::Park, UNITED_STATES)
}

/// Load the Canadian national parks table
///
/// The Canadian table carries no description; one is derived from the
/// province so that popups have something to show.
pub fn load_canadian_parks<P: AsRef<Path>>(path: P) -> Result<Vec<Entity>> {
    let mut parks = load_csv(path, EntityKind::Park, CANADA)?;
    describe_canadian_parks(&mut parks);
    Ok(parks)
}

fn describe_canadian_parks(parks: &mut [Entity]) {
    for park in parks.iter_mut().filter(|p| p.description.is_empty()) {
        park.description = format!("Canadian National Park in {}", park.states);
    }
}

/// Load an airport table from disk
pub fn load_airports<P: AsRef<Path>>(path: P) -> Result<Vec<Entity>> {
    load_csv(path, EntityKind::Airport, UNITED_STATES)
}

/// The major US and Canadian airports bundled with the crate
pub fn builtin_airports() -> Result<Vec<Entity>> {
    BuiltinTable::MajorAirports.load()
}

/// Row layout used when writing entities back out
#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    #[serde(rename = "Id")]
    identifier: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Kind")]
    kind: EntityKind,
    #[serde(rename = "Designation")]
    designation: &'a str,
    #[serde(rename = "States")]
    states: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
}

impl<'a> From<&'a Entity> for OutputRecord<'a> {
    fn from(entity: &'a Entity) -> Self {
        Self {
            identifier: &entity.identifier,
            name: &entity.name,
            kind: entity.kind,
            designation: &entity.designation,
            states: &entity.states,
            country: &entity.country,
            city: &entity.city,
            latitude: entity.location.map(|p| p.latitude()),
            longitude: entity.location.map(|p| p.longitude()),
            description: &entity.description,
            url: &entity.url,
        }
    }
}

/// Write entities as CSV with a header row
///
/// The output reads back through [`read_csv`] unchanged, apart from absent
/// locations which are written as empty cells.
pub fn write_csv<W: Write>(writer: W, entities: &[Entity]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entity in entities {
        wtr.serialize(OutputRecord::from(entity))?;
    }
    wtr.flush()?;
    Ok(())
}
