//! # park-atlas CLI
//!
//! Command-line interface for the park-atlas library.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};
use park_atlas::{
    builtin_airports, builtin_table, distance_miles, load_airports, load_canadian_parks,
    load_us_parks, nearest, resolve_source, suggest_correction, AtlasConfig, Annotator,
    Downloader, Entity, Error, FetchOptions, FetchSource, OverwriteBehavior, ProximityQuery,
    RegionClassifier, RegionFallback, Statistics,
};

mod cli;

use cli::{Cli, Commands, OutputFormat};

/// Output destination types
#[derive(Debug, PartialEq)]
enum OutputDestination {
    File(String),
    Stdout,
}

/// Resolve output destination from CLI arguments
fn resolve_output(source: &str, output: &str) -> OutputDestination {
    if output == "-" {
        OutputDestination::Stdout
    } else if output.is_empty() {
        OutputDestination::File(park_atlas::core::resolve_output_filename(source))
    } else {
        OutputDestination::File(output.to_string())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli).await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    debug!("park-atlas v{} starting", env!("PARK_ATLAS_VERSION"));
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Annotate {
            parks,
            canada_parks,
            airports,
            fallback,
            format,
            output,
        } => {
            let parks = load_parks(&parks, &canada_parks)?;
            let airports = load_airport_table(airports.as_deref())?;
            let annotator = Annotator::new(&parks, &airports)
                .with_config(&config)
                .with_classifier(classifier(&config, fallback));

            let mut writer = open_output(output.as_deref())?;
            match format {
                OutputFormat::Json => park_atlas::write_json(&mut writer, &annotator.report())?,
                OutputFormat::Csv => {
                    park_atlas::core::annotate::write_csv(&mut writer, &annotator.annotate_all())?
                }
            }
            writer.flush()?;
        }

        Commands::Stats {
            parks,
            canada_parks,
            fallback,
        } => {
            let parks = load_parks(&parks, &canada_parks)?;
            let stats = Statistics::compute(&parks, &classifier(&config, fallback));
            print!("{}", cli::report::render_statistics(&stats));
        }

        Commands::Distance { from, to } => {
            let miles = distance_miles(from, to);
            println!("{from} -> {to}: {miles:.1} mi");
        }

        Commands::Nearest {
            at,
            airports,
            table,
            radius,
            top,
        } => {
            let airports = match table {
                Some(name) => load_bundled_table(&name)?,
                None => load_airport_table(airports.as_deref())?,
            };
            let base = config.airport_query();
            let query = ProximityQuery::new(
                radius.unwrap_or(base.max_radius_miles),
                top.unwrap_or(base.top_n),
            );
            info!(
                "Searching {} places within {} mi of {at}",
                airports.len(),
                query.max_radius_miles
            );
            print!("{}", cli::report::render_nearest(&nearest(at, &airports, &query)));
        }

        Commands::Classify {
            states,
            country,
            fallback,
        } => {
            println!("{}", classifier(&config, fallback).classify(&country, &states));
        }

        Commands::Fetch {
            source,
            output,
            dry_run,
            force,
            no_clobber,
        } => {
            let overwrite = if force {
                OverwriteBehavior::Force
            } else if no_clobber {
                OverwriteBehavior::NeverOverwrite
            } else {
                OverwriteBehavior::Prompt
            };
            fetch(&config, &source, &output, dry_run, overwrite).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AtlasConfig> {
    match path {
        Some(path) => AtlasConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(AtlasConfig::default()),
    }
}

/// Fallback from the command line wins over the configuration file
fn classifier(config: &AtlasConfig, fallback: Option<RegionFallback>) -> RegionClassifier {
    match fallback {
        Some(fallback) => RegionClassifier::new(fallback),
        None => config.classifier(),
    }
}

fn load_parks(us: &[PathBuf], canada: &[PathBuf]) -> Result<Vec<Entity>> {
    let mut parks = Vec::new();
    for path in us {
        parks.extend(
            load_us_parks(path).with_context(|| format!("Failed to load parks from {}", path.display()))?,
        );
    }
    for path in canada {
        parks.extend(
            load_canadian_parks(path)
                .with_context(|| format!("Failed to load Canadian parks from {}", path.display()))?,
        );
    }
    Ok(parks)
}

fn load_airport_table(path: Option<&Path>) -> Result<Vec<Entity>> {
    match path {
        Some(path) => load_airports(path)
            .with_context(|| format!("Failed to load airports from {}", path.display())),
        None => Ok(builtin_airports()?),
    }
}

fn load_bundled_table(name: &str) -> Result<Vec<Entity>> {
    let table = builtin_table(name).ok_or_else(|| Error::SourceNotFound {
        name: name.to_string(),
        suggestion: suggest_correction(name),
    })?;
    debug!("Using bundled table {}", table.file_name());
    Ok(table.load()?)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

async fn fetch(
    config: &AtlasConfig,
    source: &str,
    output: &str,
    dry_run: bool,
    overwrite: OverwriteBehavior,
) -> Result<()> {
    let downloader = Downloader::with_config(config.sources.clone());
    let fetch_source = resolve_source(source, &config.sources)?;
    let destination = resolve_output(source, output);

    if dry_run {
        eprintln!("🔍 [DRY RUN] Would fetch {} to {destination:?}", describe(&fetch_source));
        return Ok(());
    }

    match destination {
        OutputDestination::File(file_path) => {
            eprintln!("📁 Saving to: {file_path}");
            let progress = cli::ProgressManager::new(0, &format!("🌐 Fetching {}", describe(&fetch_source)));
            let options = FetchOptions {
                overwrite,
                progress: Some(progress.callback()),
                ..Default::default()
            };
            downloader.fetch_to_file(source, &file_path, &options).await?;
            progress.pb.finish_and_clear();
            eprintln!("✅ Saved {file_path}");
        }
        OutputDestination::Stdout => {
            let (mut stream, _) = downloader.fetch_stream(source).await?;
            let mut stdout = tokio::io::stdout();
            tokio::io::copy(&mut stream, &mut stdout).await?;
            tokio::io::AsyncWriteExt::flush(&mut stdout).await?;
        }
    }

    Ok(())
}

/// Where a source's data comes from, for status lines
fn describe(source: &FetchSource) -> String {
    match source {
        FetchSource::Http { url } => url.clone(),
        FetchSource::NpsParks { url, .. } => format!("national parks from {url}"),
        FetchSource::Builtin(table) => format!("bundled table {}", table.file_name()),
    }
}
