//! Core library modules for park-atlas
//!
//! Geometry, proximity and region rules are pure; dataset loading and
//! fetching sit on top of them.

pub mod annotate;
pub mod config;
pub mod dataset;
pub mod downloader;
pub mod entity;
pub mod error;
pub mod geo;
pub mod proximity;
pub mod region;
pub mod source;
pub mod stats;
pub mod stream;

// Re-export main types for internal use
pub use downloader::Downloader;
pub use source::{resolve_output_filename, SourceConfig};
