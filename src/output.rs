//! Output formatters for the `fetch` command.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use crate::classify::{Classifier, SeverityTier};
use crate::models::{Feature, OutputEvent};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Tier colors, closest terminal match to the map palette
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const ORANGE: &str = "\x1b[38;5;208m";
const RED: &str = "\x1b[91m";

const ICON_QUAKE: &str = "🌍";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

fn tier_color(tier: SeverityTier) -> &'static str {
    match tier {
        SeverityTier::Minor => GREEN,
        SeverityTier::Moderate => YELLOW,
        SeverityTier::Strong => ORANGE,
        SeverityTier::Major => RED,
    }
}

/// Write events in human-readable format, colored by tier.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(
    writer: &mut W,
    events: &[Feature],
    classifier: &Classifier,
) -> io::Result<()> {
    for event in events {
        let time = event
            .time()
            .map_or_else(|| "unknown".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());

        let mag_str = event
            .properties
            .mag
            .map_or_else(|| "?".into(), |m| format!("{m:.1}"));

        let tier = classifier.tier(event.magnitude());
        let color = tier_color(tier);
        let label = tier.as_str().to_uppercase();
        let depth = event.depth_km();
        let place = event.place();

        writeln!(
            writer,
            "{ICON_QUAKE} {color}{BOLD}M{mag_str}{RESET} │ \
             {color}{label:8}{RESET} │ \
             {DIM}{depth:>5.0}km{RESET} │ \
             {time} UTC │ \
             {place}"
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(
    writer: &mut W,
    events: &[Feature],
    classifier: &Classifier,
) -> io::Result<()> {
    let output: Vec<OutputEvent> = events
        .iter()
        .map(|e| OutputEvent::new(e, classifier))
        .collect();
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(
    writer: &mut W,
    events: &[Feature],
    classifier: &Classifier,
) -> io::Result<()> {
    for event in events {
        let output = OutputEvent::new(event, classifier);
        let json = serde_json::to_string(&output)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[Feature],
    classifier: &Classifier,
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events, classifier),
        Format::Json => write_json(writer, events, classifier),
        Format::Ndjson => write_ndjson(writer, events, classifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureCollection;

    const SAMPLE: &str = include_str!("../tests/fixtures/sample_query.geojson");

    fn events() -> Vec<Feature> {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE).unwrap();
        feed.features
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("NDJSON".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_human_lines() {
        let mut buf = Vec::new();
        write_human(&mut buf, &events(), &Classifier::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("M6.2"));
        assert!(text.contains("STRONG"));
        assert!(text.contains("M?"));
        assert!(text.contains("Unknown location"));
    }

    #[test]
    fn test_ndjson_one_object_per_line() {
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &events(), &Classifier::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let tiers: Vec<String> = text
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["tier"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(tiers, ["strong", "minor", "moderate", "major", "major"]);
    }

    #[test]
    fn test_json_array() {
        let mut buf = Vec::new();
        write_json(&mut buf, &events(), &Classifier::default()).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(5));
        assert_eq!(v[1]["color"], "#50C878");
    }
}
