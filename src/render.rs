//! Feature rendering.
//!
//! Turns fetched events into circle markers with popups and files each
//! marker into the layer group of its severity tier.

use chrono::{Local, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::classify::{Classifier, SeverityTier};
use crate::layers::LayerRegistry;
use crate::models::{Feature, FeatureCollection};

/// Magnitude at which the popup bar is full.
const BAR_FULL_MAGNITUDE: f64 = 12.0;

/// Popup date format, day first.
const POPUP_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Visual parameters for circle markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Radius is `magnitude ^ radius_exponent`
    pub radius_exponent: f64,
    pub fill_opacity: f64,
    /// Border width in pixels
    pub weight: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius_exponent: 2.1,
            fill_opacity: 0.5,
            weight: 1.0,
        }
    }
}

impl MarkerStyle {
    /// Marker radius for a magnitude.
    ///
    /// Negative magnitudes are drawn at radius zero (a fractional power of
    /// a negative number is undefined), as is NaN.
    #[must_use]
    pub fn radius(&self, mag: f64) -> f64 {
        if mag.is_nan() {
            return 0.0;
        }
        mag.max(0.0).powf(self.radius_exponent)
    }
}

/// Width of the popup magnitude bar in percent, clamped to `[0, 100]`.
#[must_use]
pub fn bar_width_percent(mag: f64) -> f64 {
    if mag.is_nan() {
        return 0.0;
    }
    (mag / BAR_FULL_MAGNITUDE * 100.0).clamp(0.0, 100.0)
}

/// Format an event time (ms since epoch) in the given time zone.
#[must_use]
pub fn format_event_time<Tz: TimeZone>(time_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    Utc.timestamp_millis_opt(time_ms).single().map_or_else(
        || "unknown".to_string(),
        |t| t.with_timezone(tz).format(POPUP_TIME_FORMAT).to_string(),
    )
}

/// Popup content for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub place: String,
    pub time: String,
    pub magnitude: Option<f64>,
    pub bar_width: f64,
    pub color: String,
    pub url: Option<String>,
}

impl Popup {
    /// Render the popup as an HTML fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mag = self
            .magnitude
            .map_or_else(|| "?".to_string(), |m| m.to_string());
        let link = self.url.as_deref().map_or_else(String::new, |url| {
            format!(
                r#"<a class="c-popup__link" href="{}" target="_blank" rel="noopener">Event page</a>"#,
                v_htmlescape::escape(url)
            )
        });

        format!(
            r#"<div class="c-popup">
  <h2 class="c-popup__title">{place}</h2>
  <p class="c-popup__date">{time}</p>
  <p class="c-popup__text">{mag} on the Richter scale</p>
  <div class="c-popup__richter-container">
    <div class="c-popup__richter-bar c-popup__richter-bar--background"></div>
    <div class="c-popup__richter-bar c-popup__richter-bar--foreground" style="width:{width:.1}%; background-color:{color}"></div>
  </div>
  <div class="c-popup__richter-labels"><p>😴</p><p>😱</p></div>
  {link}
</div>"#,
            place = v_htmlescape::escape(&self.place),
            time = v_htmlescape::escape(&self.time),
            width = self.bar_width,
            color = self.color,
        )
    }
}

/// A magnitude-sized circle on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleMarker {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    /// Fill and border color
    pub color: String,
    pub fill_opacity: f64,
    pub weight: f64,
    pub tier: SeverityTier,
    /// Pre-rendered popup HTML
    pub popup_html: String,
}

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub rendered: usize,
    pub skipped: usize,
}

/// Builds markers from events.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    classifier: Classifier,
    style: MarkerStyle,
}

impl Renderer {
    #[must_use]
    pub fn new(classifier: Classifier, style: MarkerStyle) -> Self {
        Self { classifier, style }
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Build the popup for an event, formatting its time in `tz`.
    #[must_use]
    pub fn popup<Tz: TimeZone>(&self, event: &Feature, tz: &Tz) -> Popup
    where
        Tz::Offset: std::fmt::Display,
    {
        let mag = event.magnitude();
        Popup {
            place: event.place().to_string(),
            time: format_event_time(event.properties.time, tz),
            magnitude: event.properties.mag,
            bar_width: bar_width_percent(mag),
            color: self.classifier.classify(mag).color.to_string(),
            url: event.properties.url.clone(),
        }
    }

    /// Build the marker for an event, formatting popup times in `tz`.
    #[must_use]
    pub fn marker<Tz: TimeZone>(&self, event: &Feature, tz: &Tz) -> CircleMarker
    where
        Tz::Offset: std::fmt::Display,
    {
        let mag = event.magnitude();
        let class = self.classifier.classify(mag);
        CircleMarker {
            id: event.id.clone(),
            lat: event.latitude(),
            lon: event.longitude(),
            radius: self.style.radius(mag),
            color: class.color.to_string(),
            fill_opacity: self.style.fill_opacity,
            weight: self.style.weight,
            tier: class.tier,
            popup_html: self.popup(event, tz).to_html(),
        }
    }

    /// Render every event into `layers` using the local time zone.
    pub fn render(&self, feed: &FeatureCollection, layers: &mut LayerRegistry) -> RenderSummary {
        self.render_in(feed, layers, &Local)
    }

    /// Render every event into `layers`, formatting popup times in `tz`.
    pub fn render_in<Tz: TimeZone>(
        &self,
        feed: &FeatureCollection,
        layers: &mut LayerRegistry,
        tz: &Tz,
    ) -> RenderSummary
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut summary = RenderSummary::default();

        for event in &feed.features {
            if let Err(e) = event.validate() {
                debug!("skipping event: {}", e);
                summary.skipped += 1;
                continue;
            }

            layers.add_marker(self.marker(event, tz));
            summary.rendered += 1;
        }

        summary
    }
}
