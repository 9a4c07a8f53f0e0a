//! Plain-text output for `stats` and `nearest`

use std::fmt::Write;

use park_atlas::{CountEntry, ProximityResult, Statistics, CANADA, UNITED_STATES};

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "park"
    } else {
        "parks"
    }
}

fn write_ranking(out: &mut String, title: &str, entries: &[CountEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}: {} {}", rank + 1, entry.name, entry.count, plural(entry.count));
    }
}

/// Statistics laid out the way the map's side panel shows them
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total parks: {}", stats.total);

    let _ = writeln!(out, "\nParks by country:");
    let _ = writeln!(out, "  {UNITED_STATES}: {}", stats.country_count(UNITED_STATES));
    let _ = writeln!(out, "  {CANADA}: {}", stats.country_count(CANADA));
    for entry in stats
        .by_country
        .iter()
        .filter(|e| e.name != UNITED_STATES && e.name != CANADA)
    {
        let _ = writeln!(out, "  {}: {}", entry.name, entry.count);
    }

    let _ = writeln!(out, "\nParks by region:");
    for entry in stats.by_region.iter().filter(|e| e.count > 0) {
        let _ = writeln!(out, "  {}: {}", entry.name, entry.count);
    }

    write_ranking(&mut out, "Top 10 US states", &stats.top_states);
    write_ranking(&mut out, "Top 10 Canadian provinces", &stats.top_provinces);
    out
}

/// One line per result: identifier, name, distance
pub fn render_nearest(results: &[ProximityResult]) -> String {
    if results.is_empty() {
        return "No results within the search radius\n".to_string();
    }

    let width = results.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for r in results {
        let _ = writeln!(
            out,
            "{:<5} {:<width$}  {:>7.1} mi",
            r.identifier, r.name, r.distance_miles
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_atlas::GeoPoint;

    fn entry(name: &str, count: usize) -> CountEntry {
        CountEntry {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_render_statistics() {
        let stats = Statistics {
            total: 3,
            by_country: vec![entry(UNITED_STATES, 2), entry(CANADA, 1)],
            by_region: vec![entry("West", 2), entry("Midwest", 0), entry("Canada", 1)],
            top_states: vec![entry("WY", 2), entry("MT", 1)],
            top_provinces: vec![entry("Alberta", 1)],
        };

        let text = render_statistics(&stats);
        assert!(text.starts_with("Total parks: 3\n"));
        assert!(text.contains("  United States: 2\n"));
        assert!(text.contains("  West: 2\n"));
        assert!(!text.contains("Midwest"));
        assert!(text.contains("   1. WY: 2 parks\n"));
        assert!(text.contains("   2. MT: 1 park\n"));
        assert!(text.contains("Top 10 Canadian provinces:\n   1. Alberta: 1 park\n"));
    }

    #[test]
    fn test_render_nearest() {
        let results = vec![ProximityResult {
            identifier: "SLC".to_string(),
            name: "Salt Lake City International".to_string(),
            location: GeoPoint::new(40.7899, -111.9791),
            distance_miles: 273.14,
        }];
        assert_eq!(
            render_nearest(&results),
            "SLC   Salt Lake City International    273.1 mi\n"
        );
        assert_eq!(render_nearest(&[]), "No results within the search radius\n");
    }
}
