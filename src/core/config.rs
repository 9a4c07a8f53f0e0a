//! TOML configuration
//!
//! Every section and key is optional; missing values take the built-in
//! defaults.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::proximity::ProximityQuery;
use crate::core::region::{RegionClassifier, RegionFallback};
use crate::core::source::SourceConfig;

/// Partial override of a [`ProximityQuery`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySettings {
    pub max_radius_miles: Option<f64>,
    pub top_n: Option<usize>,
}

impl QuerySettings {
    /// Apply the overrides on top of `base`
    pub fn resolve(&self, base: ProximityQuery) -> ProximityQuery {
        ProximityQuery {
            max_radius_miles: self.max_radius_miles.unwrap_or(base.max_radius_miles),
            top_n: self.top_n.unwrap_or(base.top_n),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionSettings {
    pub fallback: RegionFallback,
}

/// Contents of a `park-atlas.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtlasConfig {
    pub airports: QuerySettings,
    pub parks: QuerySettings,
    pub regions: RegionSettings,
    pub sources: SourceConfig,
}

impl AtlasConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AtlasConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (section, query) in [("airports", self.airport_query()), ("parks", self.park_query())] {
            if !query.max_radius_miles.is_finite() || query.max_radius_miles < 0.0 {
                return Err(Error::Config(format!(
                    "[{section}] max_radius_miles must be a non-negative number, got {}",
                    query.max_radius_miles
                )));
            }
        }
        Ok(())
    }

    /// Query used for airports near a park
    pub fn airport_query(&self) -> ProximityQuery {
        self.airports.resolve(ProximityQuery::AIRPORTS)
    }

    /// Query used for other parks near a park
    pub fn park_query(&self) -> ProximityQuery {
        self.parks.resolve(ProximityQuery::PARKS)
    }

    pub fn classifier(&self) -> RegionClassifier {
        RegionClassifier::new(self.regions.fallback)
    }
}
