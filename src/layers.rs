//! Per-tier layer groups and their visibility.
//!
//! A group is created the first time a marker of its tier arrives and is
//! attached to the map at that moment. Detaching hides a group without
//! dropping its markers, so a later attach shows exactly the same set.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::classify::SeverityTier;
use crate::render::CircleMarker;

/// Togglable collection of markers for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerGroup {
    pub tier: SeverityTier,
    pub color: String,
    /// Whether the group is currently on the map
    pub attached: bool,
    pub markers: Vec<CircleMarker>,
}

/// All layer groups, keyed by tier.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    groups: BTreeMap<SeverityTier, LayerGroup>,
}

impl LayerRegistry {
    /// Add a marker to its tier's group, creating and attaching the group
    /// on first use.
    pub fn add_marker(&mut self, marker: CircleMarker) {
        let group = self.groups.entry(marker.tier).or_insert_with(|| {
            debug!("creating layer group for {} tier", marker.tier);
            LayerGroup {
                tier: marker.tier,
                color: marker.color.clone(),
                attached: true,
                markers: Vec::new(),
            }
        });
        group.markers.push(marker);
    }

    /// Attach a tier's group to the map.
    ///
    /// Returns `false` if no group exists for the tier.
    pub fn show_layer(&mut self, tier: SeverityTier) -> bool {
        self.set_attached(tier, true)
    }

    /// Detach a tier's group from the map, keeping its markers.
    ///
    /// Returns `false` if no group exists for the tier.
    pub fn remove_layer(&mut self, tier: SeverityTier) -> bool {
        self.set_attached(tier, false)
    }

    /// Attach every group, as on a freshly loaded map.
    pub fn show_all(&mut self) {
        for group in self.groups.values_mut() {
            group.attached = true;
        }
    }

    fn set_attached(&mut self, tier: SeverityTier, attached: bool) -> bool {
        match self.groups.get_mut(&tier) {
            Some(group) => {
                group.attached = attached;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, tier: SeverityTier) -> Option<&LayerGroup> {
        self.groups.get(&tier)
    }

    /// All groups, lowest tier first.
    pub fn layers(&self) -> impl Iterator<Item = &LayerGroup> {
        self.groups.values()
    }

    /// Attached groups, lowest tier first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &LayerGroup> {
        self.groups.values().filter(|g| g.attached)
    }

    /// Markers currently on the map.
    pub fn visible_markers(&self) -> impl Iterator<Item = &CircleMarker> {
        self.visible_layers().flat_map(|g| g.markers.iter())
    }

    /// Total markers held, visible or not.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.groups.values().map(|g| g.markers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, tier: SeverityTier, color: &str) -> CircleMarker {
        CircleMarker {
            id: id.to_string(),
            lat: 0.0,
            lon: 0.0,
            radius: 10.0,
            color: color.to_string(),
            fill_opacity: 0.5,
            weight: 1.0,
            tier,
            popup_html: String::new(),
        }
    }

    #[test]
    fn test_group_created_lazily_and_attached() {
        let mut layers = LayerRegistry::default();
        assert!(layers.get(SeverityTier::Strong).is_none());

        layers.add_marker(marker("a", SeverityTier::Strong, "#FC8A17"));
        layers.add_marker(marker("b", SeverityTier::Strong, "#FC8A17"));

        let group = layers.get(SeverityTier::Strong).unwrap();
        assert!(group.attached);
        assert_eq!(group.color, "#FC8A17");
        assert_eq!(group.markers.len(), 2);
        assert_eq!(layers.layers().count(), 1);
    }

    #[test]
    fn test_remove_then_show_restores_same_markers() {
        let mut layers = LayerRegistry::default();
        layers.add_marker(marker("a", SeverityTier::Minor, "#50C878"));
        layers.add_marker(marker("b", SeverityTier::Major, "#ED2939"));
        let before: Vec<String> = layers.visible_markers().map(|m| m.id.clone()).collect();

        assert!(layers.remove_layer(SeverityTier::Major));
        let hidden: Vec<&str> = layers.visible_markers().map(|m| m.id.as_str()).collect();
        assert_eq!(hidden, ["a"]);
        assert_eq!(layers.marker_count(), 2);

        assert!(layers.show_layer(SeverityTier::Major));
        assert!(layers.show_layer(SeverityTier::Major));
        let after: Vec<String> = layers.visible_markers().map(|m| m.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(layers.marker_count(), 2);
    }

    #[test]
    fn test_show_all_reattaches_hidden_groups() {
        let mut layers = LayerRegistry::default();
        layers.add_marker(marker("a", SeverityTier::Minor, "#50C878"));
        layers.add_marker(marker("b", SeverityTier::Major, "#ED2939"));
        layers.remove_layer(SeverityTier::Minor);
        layers.remove_layer(SeverityTier::Major);
        assert_eq!(layers.visible_layers().count(), 0);

        layers.show_all();
        assert_eq!(layers.visible_layers().count(), 2);
        assert_eq!(layers.visible_markers().count(), 2);
    }

    #[test]
    fn test_toggle_absent_tier() {
        let mut layers = LayerRegistry::default();
        assert!(!layers.show_layer(SeverityTier::Moderate));
        assert!(!layers.remove_layer(SeverityTier::Moderate));
        assert_eq!(layers.layers().count(), 0);
    }

    #[test]
    fn test_layers_in_tier_order() {
        let mut layers = LayerRegistry::default();
        layers.add_marker(marker("c", SeverityTier::Major, "#ED2939"));
        layers.add_marker(marker("a", SeverityTier::Minor, "#50C878"));
        layers.add_marker(marker("b", SeverityTier::Strong, "#FC8A17"));
        let tiers: Vec<SeverityTier> = layers.layers().map(|g| g.tier).collect();
        assert_eq!(
            tiers,
            [SeverityTier::Minor, SeverityTier::Strong, SeverityTier::Major]
        );
    }
}
