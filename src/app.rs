//! Application context.
//!
//! Holds the configuration, the rendered layer groups and the UI chrome
//! state in one place. The server owns a single instance; nothing here is
//! global.

use tracing::{debug, info};

use crate::chrome::{EmailField, PanelState, ThemeState};
use crate::classify::Classifier;
use crate::client::EventSource;
use crate::config::AppConfig;
use crate::errors::QuakemapError;
use crate::layers::LayerRegistry;
use crate::render::{RenderSummary, Renderer};

#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub renderer: Renderer,
    pub layers: LayerRegistry,
    pub panel: PanelState,
    pub theme: ThemeState,
    pub email: EmailField,
}

impl AppContext {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let renderer = Renderer::new(Classifier::new(config.classifier.clone()), config.marker);
        Self {
            config,
            renderer,
            layers: LayerRegistry::default(),
            panel: PanelState::default(),
            theme: ThemeState::default(),
            email: EmailField::default(),
        }
    }

    /// Fetch events once and render them into the layer groups.
    ///
    /// On error the layers are left exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub fn load<S: EventSource>(&mut self, source: &S) -> Result<RenderSummary, QuakemapError> {
        let feed = source.fetch_events(&self.config.query)?;
        let summary = self.renderer.render(&feed, &mut self.layers);
        info!(
            "rendered {} events into {} layers ({} skipped)",
            summary.rendered,
            self.layers.layers().count(),
            summary.skipped
        );
        Ok(summary)
    }

    /// Put the page state back to how a fresh page load shows it: every
    /// loaded layer attached, panel closed, no theme override, empty email
    /// field. Rendered markers are kept.
    pub fn reset_session(&mut self) {
        self.layers.show_all();
        self.panel = PanelState::default();
        self.theme = ThemeState::default();
        self.email = EmailField::default();
        debug!(
            "session reset, {} layers visible",
            self.layers.visible_layers().count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrome::{EmailEvent, Theme};
    use crate::classify::SeverityTier;
    use crate::client::QueryParams;
    use crate::models::FeatureCollection;

    const SAMPLE: &str = include_str!("../tests/fixtures/sample_query.geojson");

    struct FixtureSource;

    impl EventSource for FixtureSource {
        fn fetch_events(&self, _: &QueryParams) -> Result<FeatureCollection, QuakemapError> {
            Ok(serde_json::from_str(SAMPLE)?)
        }
    }

    struct FailingSource;

    impl EventSource for FailingSource {
        fn fetch_events(&self, _: &QueryParams) -> Result<FeatureCollection, QuakemapError> {
            Err(QuakemapError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    #[test]
    fn test_load_fills_layers() {
        let mut ctx = AppContext::new(AppConfig::default());
        let summary = ctx.load(&FixtureSource).unwrap();
        assert_eq!(summary.rendered, 5);
        assert_eq!(ctx.layers.layers().count(), 4);
        assert_eq!(ctx.layers.marker_count(), 5);
    }

    #[test]
    fn test_failed_load_leaves_map_unchanged() {
        let mut ctx = AppContext::new(AppConfig::default());
        ctx.load(&FixtureSource).unwrap();
        ctx.layers.remove_layer(SeverityTier::Minor);

        assert!(ctx.load(&FailingSource).is_err());
        assert_eq!(ctx.layers.marker_count(), 5);
        assert!(!ctx.layers.get(SeverityTier::Minor).unwrap().attached);
    }

    #[test]
    fn test_reset_session_restores_fresh_page_state() {
        let mut ctx = AppContext::new(AppConfig::default());
        ctx.load(&FixtureSource).unwrap();
        ctx.layers.remove_layer(SeverityTier::Major);
        ctx.panel.toggle();
        ctx.theme.set_override(Some(Theme::Dark));
        ctx.email.handle(EmailEvent::Blur, "nope");

        ctx.reset_session();

        assert_eq!(ctx.layers.visible_layers().count(), 4);
        assert_eq!(ctx.layers.marker_count(), 5);
        assert_eq!(ctx.panel, PanelState::Closed);
        assert_eq!(ctx.theme.effective(), Theme::Light);
        assert!(ctx.email.error_message().is_none());
        assert!(!ctx.email.is_revalidating());
    }

    #[test]
    fn test_squared_radius_config() {
        let mut config = AppConfig::default();
        config.marker.radius_exponent = 2.0;
        let mut ctx = AppContext::new(config);
        ctx.load(&FixtureSource).unwrap();

        let minor = ctx.layers.get(SeverityTier::Minor).unwrap();
        assert!((minor.markers[0].radius - 2.7 * 2.7).abs() < 1e-9);
    }
}
