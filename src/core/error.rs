//! Error types for park-atlas library
//!
//! Provides error handling for dataset loading, configuration and fetch operations,
//! plus fuzzy suggestions for mistyped source names.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::core::source::KNOWN_SOURCES;

/// Minimum combined similarity for a suggestion to be offered.
const MIN_SUGGESTION_SCORE: f64 = 0.65;

/// Find the closest known source name using Jaro-Winkler (70%) and normalized
/// Levenshtein (30%) similarity.
fn find_best_fuzzy_match(input: &str, candidates: &[&str]) -> Option<String> {
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in candidates {
        let jw_score = jaro_winkler(&input_lower, candidate);
        let lev_score = normalized_levenshtein(&input_lower, candidate);
        let score = (jw_score * 0.7) + (lev_score * 0.3);

        if score >= MIN_SUGGESTION_SCORE && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Suggest a correction for a potentially misspelled source name
///
/// Returns `None` for exact (case-insensitive) matches, for URLs, and when
/// nothing is close enough.
pub fn suggest_correction(source: &str) -> Option<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return None;
    }

    if KNOWN_SOURCES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(source))
    {
        return None;
    }

    // Users often type the output file name instead of the source name
    let stripped = source
        .trim_end_matches(".csv")
        .replace(['_', ' '], "-");

    find_best_fuzzy_match(&stripped, KNOWN_SOURCES)
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{s}'?"),
        None => format!(" (known sources: {})", KNOWN_SOURCES.join(", ")),
    }
}

/// Main error type for park-atlas operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source identifier not recognized or supported
    #[error("Source '{name}' not found or not supported{}", suggestion_hint(.suggestion))]
    SourceNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// HTTP-specific error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network connectivity issues
    #[error("Network error: {0}")]
    NetworkError(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input or failure writing CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON payload or failure writing JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Convenience result type for park-atlas operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_correction_typos() {
        assert_eq!(suggest_correction("nps-prks"), Some("nps-parks".to_string()));
        assert_eq!(suggest_correction("airprots"), Some("airports".to_string()));
        assert_eq!(suggest_correction("AIRPORT"), Some("airports".to_string()));
    }

    #[test]
    fn test_suggest_correction_file_names() {
        assert_eq!(
            suggest_correction("nps_parks.csv"),
            Some("nps-parks".to_string())
        );
        assert_eq!(
            suggest_correction("canadian_parks.csv"),
            Some("canada-parks".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_bundled_tables() {
        assert_eq!(suggest_correction("nepal-unseco"), Some("nepal-unesco".to_string()));
        assert_eq!(suggest_correction("nepal-temple"), Some("nepal-temples".to_string()));
    }

    #[test]
    fn test_suggest_correction_no_match() {
        assert_eq!(suggest_correction("airports"), None);
        assert_eq!(suggest_correction("NPS-PARKS"), None);
        assert_eq!(suggest_correction("https://example.com/data.csv"), None);
        assert_eq!(suggest_correction("zzzzzzzzzzzzzzzz"), None);
    }

    #[test]
    fn test_error_display() {
        let err = Error::SourceNotFound {
            name: "moon".to_string(),
            suggestion: None,
        };
        assert_eq!(
            err.to_string(),
            "Source 'moon' not found or not supported \
             (known sources: nps-parks, airports, canada-parks, nepal-temples, nepal-unesco)"
        );

        let err = Error::SourceNotFound {
            name: "airprots".to_string(),
            suggestion: Some("airports".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Source 'airprots' not found or not supported. Did you mean 'airports'?"
        );

        let err = Error::Config("missing table".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing table");
    }
}
