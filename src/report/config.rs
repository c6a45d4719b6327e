use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PRIMARY_COHORT: &str = "Ian";
pub const DEFAULT_BASELINE_COHORT: &str = "General";

/// Thresholds driving classification, rankings and comparisons. Any subset
/// can be overridden from a JSON file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub scale_min_score: f64,
    pub scale_max_cpa_ratio: f64,
    pub high_volume_score: f64,
    pub pause_cpa_ratio: f64,
    pub very_efficient_ratio: f64,
    pub efficient_ratio: f64,
    pub normal_ratio: f64,
    pub ranking_size: usize,
    pub comparison_band: f64,
    pub history_trend_pct: f64,
    pub primary_cohort: String,
    pub baseline_cohort: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            scale_min_score: 10.0,
            scale_max_cpa_ratio: 1.2,
            high_volume_score: 20.0,
            pause_cpa_ratio: 1.5,
            very_efficient_ratio: 0.7,
            efficient_ratio: 1.0,
            normal_ratio: 1.5,
            ranking_size: 5,
            comparison_band: 0.05,
            history_trend_pct: 10.0,
            primary_cohort: DEFAULT_PRIMARY_COHORT.to_string(),
            baseline_cohort: DEFAULT_BASELINE_COHORT.to_string(),
        }
    }
}

impl ReportConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read(path)
            .with_context(|| format!("failed to read thresholds file {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse thresholds file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "scale_min_score": 15, "primary_cohort": "Ana" }"#)
                .expect("partial config should deserialize");

        assert_eq!(config.scale_min_score, 15.0);
        assert_eq!(config.primary_cohort, "Ana");
        assert_eq!(config.baseline_cohort, DEFAULT_BASELINE_COHORT);
        assert_eq!(config.ranking_size, 5);
        assert_eq!(config.pause_cpa_ratio, 1.5);
    }

    #[test]
    fn load_without_path_returns_defaults() {
        let config = ReportConfig::load(None).expect("defaults should load");
        assert_eq!(config, ReportConfig::default());
    }
}
