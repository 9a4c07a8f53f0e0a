//! Source resolution for dataset fetching
//!
//! Maps a source name typed on the command line to where its data comes
//! from: the NPS parks API, one of the bundled tables, or a raw URL.

use serde::{Deserialize, Serialize};

use crate::core::dataset::BuiltinTable;
use crate::core::error::{suggest_correction, Error, Result};

/// Named sources accepted by `fetch`
pub const KNOWN_SOURCES: &[&str] = &[
    "nps-parks",
    "airports",
    "canada-parks",
    "nepal-temples",
    "nepal-unesco",
];

/// Source name of a bundled table
pub fn builtin_source_name(table: BuiltinTable) -> &'static str {
    match table {
        BuiltinTable::MajorAirports => "airports",
        BuiltinTable::CanadianParks => "canada-parks",
        BuiltinTable::NepalTemples => "nepal-temples",
        BuiltinTable::NepalUnescoSites => "nepal-unesco",
    }
}

/// Bundled table with the given source name (case-insensitive)
pub fn builtin_table(name: &str) -> Option<BuiltinTable> {
    BuiltinTable::ALL
        .into_iter()
        .find(|table| builtin_source_name(*table).eq_ignore_ascii_case(name))
}

/// Where a dataset is fetched from
#[derive(Debug, Clone, PartialEq)]
pub enum FetchSource {
    /// Raw download of a CSV (or any file) over HTTP
    Http { url: String },
    /// National parks from the NPS API, converted to CSV
    NpsParks { url: String, api_key: String },
    /// A table bundled with the crate
    Builtin(BuiltinTable),
}

/// Endpoints and credentials for remote sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Parks endpoint of the NPS data API
    pub nps_api_url: String,

    /// API key sent with every NPS request
    pub nps_api_key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            nps_api_url: "https://developer.nps.gov/api/v1/parks".to_string(),
            nps_api_key: "DEMO_KEY".to_string(),
        }
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolves a source string to a fetch source
pub fn resolve_source(source: &str, config: &SourceConfig) -> Result<FetchSource> {
    if is_url(source) {
        return Ok(FetchSource::Http {
            url: source.to_string(),
        });
    }

    if let Some(table) = builtin_table(source) {
        return Ok(FetchSource::Builtin(table));
    }

    match source.to_ascii_lowercase().as_str() {
        "nps-parks" => Ok(FetchSource::NpsParks {
            url: config.nps_api_url.clone(),
            api_key: config.nps_api_key.clone(),
        }),
        _ => Err(Error::SourceNotFound {
            name: source.to_string(),
            suggestion: suggest_correction(source),
        }),
    }
}

/// Generates output filename from source
pub fn resolve_output_filename(source: &str) -> String {
    if is_url(source) {
        let path = source
            .split(['?', '#'])
            .next()
            .unwrap_or(source)
            .trim_end_matches('/');
        let after_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
        return match after_scheme.split_once('/') {
            Some((_, rest)) if !rest.is_empty() => rest
                .rsplit('/')
                .next()
                .unwrap_or("download.csv")
                .to_string(),
            _ => "download.csv".to_string(),
        };
    }

    if let Some(table) = builtin_table(source) {
        return table.file_name().to_string();
    }

    match source.to_ascii_lowercase().as_str() {
        "nps-parks" => "national_parks.csv".to_string(),
        other => format!("{other}.csv"),
    }
}
