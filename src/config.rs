//! Application configuration.
//!
//! Plain structs with `Default` impls, filled in from the CLI.

use serde::Serialize;

use crate::classify::ClassifierConfig;
use crate::client::{QueryParams, USGS_QUERY_URL};
use crate::render::MarkerStyle;

/// Initial map view and base layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [25.0, 10.5],
            zoom: 3,
            max_zoom: 12,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .to_string(),
        }
    }
}

/// Everything needed to fetch, classify and draw events.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: String,
    pub query: QueryParams,
    pub map: MapView,
    pub classifier: ClassifierConfig,
    pub marker: MarkerStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: USGS_QUERY_URL.to_string(),
            query: QueryParams::default(),
            map: MapView::default(),
            classifier: ClassifierConfig::default(),
            marker: MarkerStyle::default(),
        }
    }
}
