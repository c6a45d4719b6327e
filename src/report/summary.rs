use serde_json::{Map, Value};
use tracing::warn;

use super::model::{
    ActivityBreakdown, ActivityTier, Ad, EfficiencyBreakdown, EfficiencyTier, Summary,
};
use super::normalize::coerce_number;

/// Portfolio aggregate derived from the canonical ads, so the activity
/// breakdown always adds up to the ad count.
pub fn summarize(ads: &[Ad]) -> Summary {
    let mut activity = ActivityBreakdown::default();
    let mut efficiency = EfficiencyBreakdown::default();

    for ad in ads {
        match ad.activity_tier {
            ActivityTier::Active => activity.active += 1,
            ActivityTier::Spending => activity.spending += 1,
            ActivityTier::Inactive => activity.inactive += 1,
            ActivityTier::NoData7d => activity.no_data_7d += 1,
        }
        match ad.efficiency_tier {
            EfficiencyTier::VeryEfficient => efficiency.very_efficient += 1,
            EfficiencyTier::Efficient => efficiency.efficient += 1,
            EfficiencyTier::Normal => efficiency.normal += 1,
            EfficiencyTier::Expensive => efficiency.expensive += 1,
            EfficiencyTier::NoData => efficiency.no_data += 1,
        }
    }

    debug_assert_eq!(activity.total(), ads.len());

    let total_spend = ads.iter().fold(0.0, |total, ad| total + ad.spend);
    let total_score = ads.iter().fold(0.0, |total, ad| total + ad.score);
    let global_cpa = if total_score > 0.0 {
        total_spend / total_score
    } else {
        0.0
    };

    Summary {
        total_spend,
        total_score,
        global_cpa,
        total_ads: ads.len(),
        ads_with_conversions: ads.iter().filter(|ad| ad.cpa.is_some()).count(),
        activity,
        efficiency,
    }
}

/// Logs disagreements between the pipeline's own `resumen` and the derived
/// summary. The derived values always win.
pub fn reconcile(supplied: &Map<String, Value>, derived: &Summary) {
    if let Some(total_ads) = supplied.get("total_anuncios").and_then(coerce_number) {
        if total_ads != derived.total_ads as f64 {
            warn!(
                supplied = total_ads,
                derived = derived.total_ads,
                "resumen.total_anuncios disagrees with the ad list"
            );
        }
    }

    if let Some(total_spend) = supplied.get("gasto_total").and_then(coerce_number) {
        let tolerance = (derived.total_spend.abs() * 0.01).max(1.0);
        if (total_spend - derived.total_spend).abs() > tolerance {
            warn!(
                supplied = total_spend,
                derived = derived.total_spend,
                "resumen.gasto_total disagrees with the ad list"
            );
        }
    }
}
