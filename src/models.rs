//! Data models for USGS earthquake API responses.
//!
//! These structures match the GeoJSON format returned by the FDSN event
//! query endpoint. Only the fields the map uses are required; everything
//! else is optional so partially populated events still parse.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{Classification, Classifier};
use crate::errors::QuakemapError;

/// Top-level GeoJSON response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakemapError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.id.is_empty() {
            return Err(QuakemapError::Validation("empty event ID".into()));
        }
        if self.geometry.coordinates.len() < 2 {
            return Err(QuakemapError::Validation(format!(
                "event {} has {} coordinates, need at least longitude and latitude",
                self.id,
                self.geometry.coordinates.len()
            )));
        }
        Ok(())
    }

    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.properties.time).single()
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates.first().copied().unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates.get(1).copied().unwrap_or(0.0)
    }

    /// Get depth in kilometers (positive down).
    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.geometry.coordinates.get(2).copied().unwrap_or(0.0)
    }

    /// Magnitude, with a missing value mapped to NaN.
    ///
    /// NaN classifies as the highest tier, so events without a reported
    /// magnitude stay visible on the map.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.properties.mag.unwrap_or(f64::NAN)
    }

    /// Place description or a fixed placeholder.
    #[must_use]
    pub fn place(&self) -> &str {
        self.properties
            .place
            .as_deref()
            .unwrap_or("Unknown location")
    }
}

/// Geographic geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from the USGS API.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    #[serde(default)]
    pub mag: Option<f64>,

    /// Magnitude type (mb, ml, mww, etc.)
    #[serde(rename = "magType", default)]
    pub mag_type: Option<String>,

    /// Human-readable place description
    #[serde(default)]
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Event page URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Simplified event for output.
///
/// This is the normalized structure emitted by `fetch` in JSON/NDJSON.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvent {
    pub id: String,
    pub time: String,
    pub magnitude: Option<f64>,
    pub magnitude_type: Option<String>,
    pub tier: String,
    pub color: String,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub place: Option<String>,
    pub url: Option<String>,
}

impl OutputEvent {
    /// Build the output record for an event using the given classifier.
    #[must_use]
    pub fn new(f: &Feature, classifier: &Classifier) -> Self {
        let Classification { tier, color } = classifier.classify(f.magnitude());
        Self {
            id: f.id.clone(),
            time: f
                .time()
                .map_or_else(|| "unknown".into(), |t| t.to_rfc3339()),
            magnitude: f.properties.mag,
            magnitude_type: f.properties.mag_type.clone(),
            tier: tier.as_str().to_string(),
            color: color.to_string(),
            depth_km: f.depth_km(),
            latitude: f.latitude(),
            longitude: f.longitude(),
            place: f.properties.place.clone(),
            url: f.properties.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../tests/fixtures/sample_query.geojson");

    #[test]
    fn test_parse_sample_query() {
        let feed: FeatureCollection =
            serde_json::from_str(SAMPLE).expect("failed to parse sample query");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.type_, "FeatureCollection");
        assert_eq!(feed.features.len(), 5);

        for feature in &feed.features {
            feature.validate().expect("invalid feature");
        }
    }

    #[test]
    fn test_coordinates_are_lon_lat() {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE).unwrap();
        let first = &feed.features[0];
        assert!((first.longitude() - 142.373).abs() < 1e-9);
        assert!((first.latitude() - 37.6981).abs() < 1e-9);
        assert!((first.depth_km() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_magnitude_and_place() {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE).unwrap();
        let unnamed = feed
            .features
            .iter()
            .find(|f| f.properties.mag.is_none())
            .expect("fixture has an event without magnitude");
        assert!(unnamed.magnitude().is_nan());
        assert_eq!(unnamed.place(), "Unknown location");
    }

    #[test]
    fn test_rejects_wrong_type() {
        let json = r#"{"type":"Feature","features":[]}"#;
        let feed: FeatureCollection = serde_json::from_str(json).unwrap();
        assert!(matches!(
            feed.validate(),
            Err(QuakemapError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_feature_needs_two_coordinates() {
        let json = r#"{
            "id": "x1",
            "geometry": {"coordinates": [10.0]},
            "properties": {"mag": 3.0, "time": 0}
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert!(feature.validate().is_err());
    }

    #[test]
    fn test_output_event_carries_tier() {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE).unwrap();
        let out = OutputEvent::new(&feed.features[0], &Classifier::default());
        assert_eq!(out.tier, "strong");
        assert_eq!(out.color, "#FC8A17");
        assert!(out.time.starts_with("2020-01-"));
    }
}
