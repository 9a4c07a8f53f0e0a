//! Great-circle distance and coordinate handling
//!
//! Coordinates are WGS-84 degrees. No datum correction is performed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;

/// Mean Earth radius in miles used by the Haversine formula
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A validated geographic position
///
/// Construct with [`GeoPoint::checked`] or [`GeoPoint::parse`] when reading
/// untrusted input: both reject out-of-range values and the `(0, 0)` sentinel
/// that the source tables use for "no location". Deserialization goes through
/// the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point without validation (for trusted input)
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a point, returning `None` for non-finite, out-of-range or
    /// zero-sentinel coordinates
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        let point = Self::new(latitude, longitude);
        (!point.is_sentinel()).then_some(point)
    }

    /// Whether this is the `(0, 0)` "no location" marker
    ///
    /// [`GeoPoint::new`] does not reject it, so consumers check again.
    pub fn is_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Parse a point from the textual latitude/longitude columns of a table
    ///
    /// Missing or unparseable values yield `None`, never an error.
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim().parse::<f64>().ok()?;
        let longitude = longitude.trim().parse::<f64>().ok()?;
        Self::checked(latitude, longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another point in miles
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_miles(*self, *other)
    }

    /// Format as `"40.6413°N, 73.7781°W"` with the given number of decimals
    pub fn format_with_precision(&self, precision: usize) -> String {
        let lat_dir = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let lon_dir = if self.longitude >= 0.0 { 'E' } else { 'W' };
        format!(
            "{:.precision$}°{lat_dir}, {:.precision$}°{lon_dir}",
            self.latitude.abs(),
            self.longitude.abs(),
        )
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_precision(4))
    }
}

/// Unvalidated wire form of a [`GeoPoint`]
#[derive(Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::checked(raw.latitude, raw.longitude).ok_or_else(|| {
            Error::InvalidInput(format!(
                "({}, {}) is not a valid location",
                raw.latitude, raw.longitude
            ))
        })
    }
}

/// Parses `"lat,lon"` as typed on the command line
impl FromStr for GeoPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| {
            Error::InvalidInput(format!("Coordinate must be in format 'lat,lon', got '{s}'"))
        })?;
        GeoPoint::parse(lat, lon).ok_or_else(|| {
            Error::InvalidInput(format!(
                "'{s}' is not a valid location (out of range, unparseable or 0,0)"
            ))
        })
    }
}

/// Haversine great-circle distance between two points in miles
///
/// Callers are responsible for excluding absent locations; this function
/// accepts any finite input.
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    // Rounding can push h past 1 for near-antipodal points
    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}
