use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::config::ReportConfig;
use super::model::{ManagerComparison, ManagerMetrics, Verdict};
use super::normalize::coerce_number;

/// Reads the cohort map. Fields are coerced like ad fields and default to
/// zero; only entries that are not objects are skipped.
pub fn parse_cohorts(value: &Value) -> Option<BTreeMap<String, ManagerMetrics>> {
    let Some(entries) = value.as_object() else {
        warn!(section = "comparativa_managers", "section is not an object; ignoring");
        return None;
    };

    let mut cohorts = BTreeMap::new();
    for (name, raw) in entries {
        let Some(fields) = raw.as_object() else {
            warn!(cohort = %name, "skipping cohort metrics that are not an object");
            continue;
        };
        cohorts.insert(name.clone(), cohort_metrics(fields));
    }
    Some(cohorts)
}

fn cohort_metrics(fields: &Map<String, Value>) -> ManagerMetrics {
    let number = |keys: &[&str]| -> f64 {
        keys.iter()
            .find_map(|key| fields.get(*key).and_then(coerce_number))
            .unwrap_or(0.0)
    };

    ManagerMetrics {
        spend: number(&["gasto", "spend"]),
        conversions: number(&["conversiones", "conversions"]),
        cpa: number(&["cpa_real", "cpa"]),
        average_quality: number(&["calidad_promedio", "average_quality"]),
        ad_count: number(&["cant_anuncios", "ad_count"]).max(0.0).round() as u64,
    }
}

/// Compares the primary cohort's CPA against the baseline cohort. Returns
/// `None` when either cohort is missing or fewer than two cohorts exist.
pub fn compare_managers(
    cohorts: &BTreeMap<String, ManagerMetrics>,
    config: &ReportConfig,
) -> Option<ManagerComparison> {
    if cohorts.len() < 2 {
        return None;
    }
    let primary = cohorts.get(&config.primary_cohort)?;
    let baseline = cohorts.get(&config.baseline_cohort)?;

    let (verdict, delta_pct) = cpa_verdict(primary.cpa, baseline.cpa, config.comparison_band);

    Some(ManagerComparison {
        primary_cohort: config.primary_cohort.clone(),
        baseline_cohort: config.baseline_cohort.clone(),
        primary: primary.clone(),
        baseline: baseline.clone(),
        verdict,
        delta_pct,
    })
}

/// Lower CPA is better. Both CPAs must be strictly positive to produce
/// anything other than `Equal`.
pub fn cpa_verdict(primary_cpa: f64, baseline_cpa: f64, band: f64) -> (Verdict, f64) {
    if !(primary_cpa > 0.0 && baseline_cpa > 0.0) {
        return (Verdict::Equal, 0.0);
    }

    if primary_cpa < baseline_cpa * (1.0 - band) {
        (
            Verdict::Better,
            (baseline_cpa - primary_cpa) / baseline_cpa * 100.0,
        )
    } else if primary_cpa > baseline_cpa * (1.0 + band) {
        (
            Verdict::Worse,
            (primary_cpa - baseline_cpa) / baseline_cpa * 100.0,
        )
    } else {
        (Verdict::Equal, 0.0)
    }
}
