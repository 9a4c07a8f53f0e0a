//! CLI-specific code for park-atlas
//!
//! Argument definitions, progress display and plain-text reports, kept
//! apart from the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use park_atlas::{GeoPoint, RegionFallback};

pub mod progress;
pub mod report;

pub use progress::ProgressManager;

#[derive(Parser)]
#[command(name = "park-atlas")]
#[command(about = "Annotate national park datasets with nearby airports, nearby parks and regions")]
#[command(long_about = "Assembles park and airport tables and annotates them for map rendering:
  park-atlas fetch nps-parks                       # NPS API -> national_parks.csv
  park-atlas fetch airports                        # bundled table -> major_airports.csv
  park-atlas fetch canada-parks                    # bundled table -> canadian_parks.csv
  park-atlas fetch nepal-unesco                    # bundled table -> nepal_unesco_sites.csv
  park-atlas annotate --parks national_parks.csv --canada-parks canadian_parks.csv
  park-atlas nearest --at 44.60,-110.55 --radius 300
  park-atlas classify --states \"AK, CA\"

Configuration:
  --config park-atlas.toml      # query radii, result caps, region fallback, NPS API key")]
#[command(version = env!("PARK_ATLAS_VERSION"))]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output layout of `annotate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document with entities and statistics
    #[default]
    Json,
    /// One flat row per park
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Annotate parks with region, nearby airports and nearby parks
    Annotate {
        /// US park tables
        #[arg(long, required = true, num_args = 1.., value_name = "FILE")]
        parks: Vec<PathBuf>,

        /// Canadian park tables
        #[arg(long, num_args = 1.., value_name = "FILE")]
        canada_parks: Vec<PathBuf>,

        /// Airport table (defaults to the bundled major airports)
        #[arg(long, value_name = "FILE")]
        airports: Option<PathBuf>,

        /// Region for parks no rule matches: "other" or "west"
        #[arg(long)]
        fallback: Option<RegionFallback>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print park counts by country, region, state and province
    Stats {
        /// US park tables
        #[arg(long, required = true, num_args = 1.., value_name = "FILE")]
        parks: Vec<PathBuf>,

        /// Canadian park tables
        #[arg(long, num_args = 1.., value_name = "FILE")]
        canada_parks: Vec<PathBuf>,

        /// Region for parks no rule matches: "other" or "west"
        #[arg(long)]
        fallback: Option<RegionFallback>,
    },

    /// Great-circle distance between two points in miles
    Distance {
        /// Start point as LAT,LON
        #[arg(long, allow_hyphen_values = true, value_name = "LAT,LON")]
        from: GeoPoint,

        /// End point as LAT,LON
        #[arg(long, allow_hyphen_values = true, value_name = "LAT,LON")]
        to: GeoPoint,
    },

    /// List the airports (or other bundled places) nearest to a point
    Nearest {
        /// Target point as LAT,LON
        #[arg(long, allow_hyphen_values = true, value_name = "LAT,LON")]
        at: GeoPoint,

        /// Airport table (defaults to the bundled major airports)
        #[arg(long, value_name = "FILE")]
        airports: Option<PathBuf>,

        /// Search a bundled table instead, e.g. "canada-parks" or "nepal-unesco"
        #[arg(long, value_name = "NAME", conflicts_with = "airports")]
        table: Option<String>,

        /// Search radius in miles
        #[arg(long, value_name = "MILES")]
        radius: Option<f64>,

        /// Maximum number of results
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Show the region a set of state codes falls in
    Classify {
        /// Comma-separated state or province codes, e.g. "WY, MT, ID"
        #[arg(long, allow_hyphen_values = true)]
        states: String,

        /// Country of the park
        #[arg(long, default_value = "United States")]
        country: String,

        /// Region for states no rule matches: "other" or "west"
        #[arg(long)]
        fallback: Option<RegionFallback>,
    },

    /// Fetch a dataset: "nps-parks", a bundled table ("airports", "canada-parks",
    /// "nepal-temples", "nepal-unesco") or an http(s) URL
    Fetch {
        /// Source to fetch
        source: String,

        /// Output file path, or "-" for stdout
        #[arg(default_value = "")]
        output: String,

        /// Show what would be fetched without fetching
        #[arg(long)]
        dry_run: bool,

        /// Force overwrite existing files without prompting
        #[arg(short, long, conflicts_with = "no_clobber")]
        force: bool,

        /// Never overwrite existing files (fail if destination exists)
        #[arg(long)]
        no_clobber: bool,
    },
}
