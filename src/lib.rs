//! # park-atlas Library
//!
//! Geospatial annotation of national park datasets for an external map
//! renderer: great-circle distances, nearest airports and parks within a
//! radius, and region labels from a fixed rule table.
//!
//! ## Features
//!
//! - **Distance engine**: Haversine distance in miles
//! - **Proximity queries**: nearest candidates within a radius, stable order
//! - **Region rules**: priority-ordered classification with an explicit fallback
//! - **Datasets**: CSV loading with the column aliases used by the park tables
//! - **Bundled tables**: major airports, Canadian parks, Nepal temples and UNESCO sites
//! - **Fetching**: NPS API, the bundled tables, or any URL, with retry and resume
//!
//! ## Basic Usage
//!
//! ```rust
//! use park_atlas::{builtin_airports, nearest, GeoPoint, ProximityQuery};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let airports = builtin_airports()?;
//! let yosemite = GeoPoint::new(37.8651, -119.5383);
//!
//! for hit in nearest(yosemite, &airports, &ProximityQuery::AIRPORTS) {
//!     println!("{} ({:.1} mi)", hit.name, hit.distance_miles);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Annotating Parks
//!
//! ```rust,no_run
//! use park_atlas::{builtin_airports, load_canadian_parks, load_us_parks, Annotator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut parks = load_us_parks("national_parks.csv")?;
//! parks.extend(load_canadian_parks("canadian_parks.csv")?);
//! let airports = builtin_airports()?;
//!
//! let report = Annotator::new(&parks, &airports).report();
//! park_atlas::write_json(std::io::stdout(), &report)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Fetching Datasets
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Parks from the NPS API, saved as national_parks.csv
//!     park_atlas::get("nps-parks", None).await?;
//!
//!     // Bundled airport table to a chosen path
//!     park_atlas::get("airports", Some("data/airports.csv")).await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use tokio::io::AsyncRead;

pub use crate::core::annotate::{format_nearby, write_json, AnnotatedEntity, Annotator, AtlasReport};
pub use crate::core::config::{AtlasConfig, QuerySettings};
pub use crate::core::dataset::{
    builtin_airports, load_airports, load_canadian_parks, load_csv, load_us_parks, read_csv,
    BuiltinTable, CANADA, NEPAL, UNITED_STATES,
};
pub use crate::core::entity::{Entity, EntityKind, Locatable};
pub use crate::core::error::{suggest_correction, Error, Result};
pub use crate::core::geo::{distance_miles, GeoPoint, EARTH_RADIUS_MILES};
pub use crate::core::proximity::{nearest, ProximityQuery, ProximityResult};
pub use crate::core::region::{classify_region, Region, RegionClassifier, RegionFallback};
pub use crate::core::source::{
    builtin_source_name, builtin_table, resolve_source, FetchSource, KNOWN_SOURCES,
};
pub use crate::core::stats::{CountEntry, Statistics};
pub use crate::core::stream::{FetchOptions, OverwriteBehavior, ProgressCallback};

pub mod core;

/// Fetch a dataset to a file
///
/// # Arguments
/// * `source` - `"nps-parks"`, a bundled table name such as `"canada-parks"`, or an http(s) URL
/// * `dest` - Optional destination file path. If None, auto-generates filename
pub async fn get(source: &str, dest: Option<&str>) -> Result<()> {
    get_with_options(source, dest, FetchOptions::default()).await
}

/// Fetch a dataset and return a stream of its bytes
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tokio::io::AsyncReadExt;
///
/// let mut stream = park_atlas::get_stream("airports").await?;
/// let mut csv = String::new();
/// stream.read_to_string(&mut csv).await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_stream(source: &str) -> Result<impl AsyncRead + Send + Unpin> {
    let downloader = core::Downloader::new();
    let (stream, _total_size) = downloader.fetch_stream(source).await?;
    Ok(stream)
}

/// Fetch with progress tracking
///
/// The callback receives `(bytes_written, total_bytes)`.
pub async fn get_with_progress<F>(source: &str, dest: Option<&str>, progress: F) -> Result<()>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let options = FetchOptions {
        progress: Some(Arc::new(progress)),
        ..Default::default()
    };
    get_with_options(source, dest, options).await
}

/// Fetch with custom options
///
/// # Examples
/// ```rust,no_run
/// use park_atlas::{FetchOptions, OverwriteBehavior};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = FetchOptions {
///     overwrite: OverwriteBehavior::Force,
///     ..Default::default()
/// };
/// park_atlas::get_with_options("airports", None, options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_with_options(source: &str, dest: Option<&str>, options: FetchOptions) -> Result<()> {
    let downloader = core::Downloader::new();

    let file_path = match dest {
        Some(path) => path.to_string(),
        None => core::resolve_output_filename(source),
    };

    downloader.fetch_to_file(source, &file_path, &options).await
}

/// Advanced API: a fetcher with custom endpoints or API key
///
/// # Examples
/// ```rust,no_run
/// use park_atlas::{Downloader, FetchOptions, SourceConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SourceConfig {
///     nps_api_key: "my-key".to_string(),
///     ..Default::default()
/// };
///
/// let downloader = Downloader::with_config(config);
/// downloader
///     .fetch_to_file("nps-parks", "national_parks.csv", &FetchOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub use crate::core::{Downloader, SourceConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_get_builtin_airports_to_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("airports.csv");

        get("airports", Some(file_path.to_str().unwrap())).await.unwrap();

        let airports = load_airports(&file_path).unwrap();
        assert_eq!(airports.len(), 65);
    }

    #[tokio::test]
    async fn test_get_with_progress_reports_total() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("airports.csv");
        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = Arc::clone(&seen);

        get_with_progress("airports", Some(file_path.to_str().unwrap()), move |done, total| {
            assert_eq!(done, total);
            seen_clone.store(total, Ordering::SeqCst);
        })
        .await
        .unwrap();

        let size = std::fs::metadata(&file_path).unwrap().len();
        assert_eq!(seen.load(Ordering::SeqCst), size);
    }

    #[tokio::test]
    async fn test_get_stream_nepal_sites() {
        use tokio::io::AsyncReadExt;

        let mut stream = get_stream("nepal-unesco").await.unwrap();
        let mut csv = String::new();
        stream.read_to_string(&mut csv).await.unwrap();

        let sites = read_csv(csv.as_bytes(), EntityKind::Site, NEPAL).unwrap();
        assert_eq!(sites.len(), 4);
    }

    #[tokio::test]
    async fn test_get_unknown_source() {
        let result = get("moon-parks", Some("unused.csv")).await;
        assert!(matches!(result, Err(Error::SourceNotFound { .. })));
    }
}
