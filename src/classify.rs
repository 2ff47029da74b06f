//! Magnitude classification.
//!
//! Maps a magnitude onto one of four severity tiers and the tier's display
//! color. Intervals are half-open with each boundary belonging to the
//! higher tier:
//!
//! | magnitude       | tier     | color     |
//! |-----------------|----------|-----------|
//! | `< 4`           | minor    | `#50C878` |
//! | `4 ..< 5`       | moderate | `#FFDA29` |
//! | `5 ..< 7.5`     | strong   | `#FC8A17` |
//! | `>= 7.5`        | major    | `#ED2939` |
//!
//! Classification is total: NaN fails every `<` comparison and lands in
//! the major tier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::QuakemapError;

/// Severity bucket derived from magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Minor,
    Moderate,
    Strong,
    Major,
}

impl SeverityTier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 4] = [Self::Minor, Self::Moderate, Self::Strong, Self::Major];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::Major => "major",
        }
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Minor => 0,
            Self::Moderate => 1,
            Self::Strong => 2,
            Self::Major => 3,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SeverityTier {
    type Err = QuakemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "strong" => Ok(Self::Strong),
            "major" => Ok(Self::Major),
            _ => Err(QuakemapError::UnknownTier(s.to_string())),
        }
    }
}

/// Thresholds and colors used by the [`Classifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Lowest magnitude of the moderate tier
    pub moderate_from: f64,
    /// Lowest magnitude of the strong tier
    pub strong_from: f64,
    /// Lowest magnitude of the major tier
    pub major_from: f64,
    /// Colors indexed by [`SeverityTier::index`]
    pub colors: [String; 4],
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            moderate_from: 4.0,
            strong_from: 5.0,
            major_from: 7.5,
            colors: [
                "#50C878".to_string(),
                "#FFDA29".to_string(),
                "#FC8A17".to_string(),
                "#ED2939".to_string(),
            ],
        }
    }
}

/// Result of classifying one magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub tier: SeverityTier,
    pub color: &'a str,
}

/// Pure magnitude classifier.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Tier for a magnitude.
    #[must_use]
    pub fn tier(&self, mag: f64) -> SeverityTier {
        let c = &self.config;
        match mag {
            m if m < c.moderate_from => SeverityTier::Minor,
            m if m < c.strong_from => SeverityTier::Moderate,
            m if m < c.major_from => SeverityTier::Strong,
            _ => SeverityTier::Major,
        }
    }

    /// Display color for a tier.
    #[must_use]
    pub fn color(&self, tier: SeverityTier) -> &str {
        &self.config.colors[tier.index()]
    }

    /// Tier and color for a magnitude.
    #[must_use]
    pub fn classify(&self, mag: f64) -> Classification<'_> {
        let tier = self.tier(mag);
        Classification {
            tier,
            color: self.color(tier),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_higher_tier() {
        let c = Classifier::default();
        assert_eq!(c.tier(3.99), SeverityTier::Minor);
        assert_eq!(c.tier(4.0), SeverityTier::Moderate);
        assert_eq!(c.tier(4.99), SeverityTier::Moderate);
        assert_eq!(c.tier(5.0), SeverityTier::Strong);
        assert_eq!(c.tier(7.49), SeverityTier::Strong);
        assert_eq!(c.tier(7.5), SeverityTier::Major);
    }

    #[test]
    fn test_colors() {
        let c = Classifier::default();
        assert_eq!(c.classify(2.5).color, "#50C878");
        assert_eq!(c.classify(4.5).color, "#FFDA29");
        assert_eq!(c.classify(6.2).color, "#FC8A17");
        assert_eq!(c.classify(9.1).color, "#ED2939");
    }

    #[test]
    fn test_total_over_odd_values() {
        let c = Classifier::default();
        assert_eq!(c.tier(-1.2), SeverityTier::Minor);
        assert_eq!(c.tier(f64::NEG_INFINITY), SeverityTier::Minor);
        assert_eq!(c.tier(f64::INFINITY), SeverityTier::Major);
        assert_eq!(c.tier(f64::NAN), SeverityTier::Major);
    }

    #[test]
    fn test_tiers_are_monotonic() {
        let c = Classifier::default();
        let mut prev = SeverityTier::Minor;
        let mut mag = -2.0;
        while mag <= 12.0 {
            let tier = c.tier(mag);
            assert!(tier >= prev, "tier dropped at magnitude {mag}");
            prev = tier;
            mag += 0.01;
        }
        assert_eq!(prev, SeverityTier::Major);
    }

    #[test]
    fn test_custom_thresholds() {
        let c = Classifier::new(ClassifierConfig {
            moderate_from: 3.0,
            ..ClassifierConfig::default()
        });
        assert_eq!(c.tier(3.5), SeverityTier::Moderate);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("strong".parse::<SeverityTier>().unwrap(), SeverityTier::Strong);
        assert_eq!("MAJOR".parse::<SeverityTier>().unwrap(), SeverityTier::Major);
        assert!("great".parse::<SeverityTier>().is_err());
        for tier in SeverityTier::ALL {
            assert_eq!(SeverityTier::ALL[tier.index()], tier);
        }
    }
}
