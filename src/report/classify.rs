use super::config::ReportConfig;
use super::model::{
    ActionKind, ActivityTier, Ad, EfficiencyTier, ScaleCandidate, UrgentAction,
};
use super::normalize::NormalizedAd;

const SCALE_PLAYBOOK: [&str; 4] = [
    "Duplicate the targeting and audience, not the creative",
    "Use a new image or video that is not running in another campaign",
    "Keep the same segmentation",
    "Start with the same budget as the original",
];

/// Statistical median of the positive values; 0 when there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted = values
        .into_iter()
        .filter(|value| value.is_finite() && *value > 0.0)
        .collect::<Vec<f64>>();
    if sorted.is_empty() {
        return 0.0;
    }

    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn classify_efficiency(cpa: Option<f64>, median_cpa: f64, config: &ReportConfig) -> EfficiencyTier {
    let Some(cpa) = cpa else {
        return EfficiencyTier::NoData;
    };
    if median_cpa <= 0.0 {
        return EfficiencyTier::Normal;
    }

    let ratio = cpa / median_cpa;
    if ratio <= config.very_efficient_ratio {
        EfficiencyTier::VeryEfficient
    } else if ratio <= config.efficient_ratio {
        EfficiencyTier::Efficient
    } else if ratio <= config.normal_ratio {
        EfficiencyTier::Normal
    } else {
        EfficiencyTier::Expensive
    }
}

/// An upstream tier wins over re-derivation so pipeline-side thresholds
/// are preserved.
pub fn resolve_efficiency(
    supplied: Option<EfficiencyTier>,
    cpa: Option<f64>,
    median_cpa: f64,
    config: &ReportConfig,
) -> EfficiencyTier {
    supplied.unwrap_or_else(|| classify_efficiency(cpa, median_cpa, config))
}

/// Activity is never re-derived here.
pub fn resolve_activity(supplied: Option<ActivityTier>) -> ActivityTier {
    supplied.unwrap_or_default()
}

pub fn classify_ad(ad: NormalizedAd, median_cpa: f64, config: &ReportConfig) -> Ad {
    Ad {
        efficiency_tier: resolve_efficiency(ad.efficiency_tier, ad.cpa, median_cpa, config),
        activity_tier: resolve_activity(ad.activity_tier),
        name: ad.name,
        spend: ad.spend,
        cpa: ad.cpa,
        score: ad.score,
        score_7d: ad.score_7d,
        spend_7d: ad.spend_7d,
    }
}

pub fn scale_candidate(ad: &Ad, median_cpa: f64, config: &ReportConfig) -> Option<ScaleCandidate> {
    let cpa = ad.cpa?;
    let meets_score = ad.score >= config.scale_min_score;
    let meets_cpa = cpa <= median_cpa * config.scale_max_cpa_ratio;
    if !(meets_score && meets_cpa) {
        return None;
    }

    let mut justifications = Vec::new();
    if ad.score >= config.high_volume_score {
        justifications.push(format!("High volume: {:.0} weighted conversions", ad.score));
    } else {
        justifications.push(format!(
            "Score {:.1} at or above the minimum of {:.0}",
            ad.score, config.scale_min_score
        ));
    }

    if cpa <= median_cpa * config.very_efficient_ratio {
        justifications.push(format!(
            "Very efficient: CPA {:.0} is {:.0}% below the median",
            cpa,
            (1.0 - cpa / median_cpa) * 100.0
        ));
    } else if cpa <= median_cpa * config.efficient_ratio {
        justifications.push(format!(
            "Efficient: CPA {cpa:.0} is at or below the median of {median_cpa:.0}"
        ));
    } else {
        justifications.push(format!(
            "Acceptable CPA: {:.0}, within {:.0}% of the median",
            cpa,
            config.scale_max_cpa_ratio * 100.0
        ));
    }

    if ad.activity_tier == ActivityTier::Active {
        justifications.push(format!(
            "Active: {:.1} conversions in the last 7 days",
            ad.score_7d
        ));
    }

    Some(ScaleCandidate {
        name: ad.name.clone(),
        score: ad.score,
        cpa,
        spend: ad.spend,
        activity_tier: ad.activity_tier,
        justifications,
        playbook: SCALE_PLAYBOOK.iter().map(|step| step.to_string()).collect(),
    })
}

/// Eligible ads ordered by score descending, then lower CPA, then name.
pub fn scale_candidates(ads: &[Ad], median_cpa: f64, config: &ReportConfig) -> Vec<ScaleCandidate> {
    let mut candidates = ads
        .iter()
        .filter_map(|ad| scale_candidate(ad, median_cpa, config))
        .collect::<Vec<ScaleCandidate>>();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.cpa.total_cmp(&b.cpa))
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates
}

/// At most one action per ad. PAUSE is checked before REVIEW.
pub fn urgent_action(ad: &Ad, median_cpa: f64, config: &ReportConfig) -> Option<UrgentAction> {
    if ad.spend <= 0.0 {
        return None;
    }

    if let Some(cpa) = ad.cpa {
        let overshoots = median_cpa > 0.0 && cpa > median_cpa * config.pause_cpa_ratio;
        if overshoots && ad.activity_tier.is_spending() {
            return Some(UrgentAction {
                kind: ActionKind::Pause,
                name: ad.name.clone(),
                reason: format!(
                    "CPA {:.0} is {:.1}x the median ({:.0})",
                    cpa,
                    cpa / median_cpa,
                    median_cpa
                ),
                action: "Pause and move the budget to efficient ads".to_string(),
            });
        }
    }

    if ad.spend_7d > 0.0 && ad.score_7d == 0.0 {
        return Some(UrgentAction {
            kind: ActionKind::Review,
            name: ad.name.clone(),
            reason: format!(
                "Spent {:.0} in the last 7 days with zero conversions",
                ad.spend_7d
            ),
            action: "Review targeting and creative before spending more".to_string(),
        });
    }

    None
}

pub fn urgent_actions(ads: &[Ad], median_cpa: f64, config: &ReportConfig) -> Vec<UrgentAction> {
    let mut actions = ads
        .iter()
        .filter_map(|ad| urgent_action(ad, median_cpa, config))
        .collect::<Vec<UrgentAction>>();

    actions.sort_by_key(|action| action_rank(action.kind));
    actions
}

fn action_rank(kind: ActionKind) -> u8 {
    match kind {
        ActionKind::Pause => 0,
        ActionKind::Review => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(name: &str, score: f64, cpa: Option<f64>, activity: ActivityTier) -> Ad {
        Ad {
            name: name.to_string(),
            spend: cpa.map(|value| value * score).unwrap_or(500.0),
            cpa,
            score,
            score_7d: 0.0,
            spend_7d: 0.0,
            efficiency_tier: EfficiencyTier::NoData,
            activity_tier: activity,
        }
    }

    #[test]
    fn median_handles_odd_even_and_empty_inputs() {
        assert_eq!(median([3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(Vec::<f64>::new()), 0.0);
        assert_eq!(median([0.0, -1.0, f64::NAN]), 0.0);
    }

    #[test]
    fn efficiency_tiers_follow_median_ratio() {
        let config = ReportConfig::default();
        assert_eq!(classify_efficiency(Some(70.0), 100.0, &config), EfficiencyTier::VeryEfficient);
        assert_eq!(classify_efficiency(Some(100.0), 100.0, &config), EfficiencyTier::Efficient);
        assert_eq!(classify_efficiency(Some(150.0), 100.0, &config), EfficiencyTier::Normal);
        assert_eq!(classify_efficiency(Some(151.0), 100.0, &config), EfficiencyTier::Expensive);
        assert_eq!(classify_efficiency(None, 100.0, &config), EfficiencyTier::NoData);
        assert_eq!(classify_efficiency(Some(10.0), 0.0, &config), EfficiencyTier::Normal);
    }

    #[test]
    fn supplied_efficiency_takes_precedence() {
        let config = ReportConfig::default();
        let tier = resolve_efficiency(Some(EfficiencyTier::Expensive), Some(10.0), 100.0, &config);
        assert_eq!(tier, EfficiencyTier::Expensive);

        let derived = resolve_efficiency(None, Some(10.0), 100.0, &config);
        assert_eq!(derived, EfficiencyTier::VeryEfficient);
    }

    #[test]
    fn activity_defaults_to_no_data() {
        assert_eq!(resolve_activity(None), ActivityTier::NoData7d);
        assert_eq!(resolve_activity(Some(ActivityTier::Inactive)), ActivityTier::Inactive);
    }

    #[test]
    fn scale_candidate_requires_score_and_cpa_thresholds() {
        let config = ReportConfig::default();

        let qualifies = ad("Winner", 12.0, Some(110.0), ActivityTier::Active);
        let candidate = scale_candidate(&qualifies, 100.0, &config).expect("should qualify");
        assert_eq!(candidate.cpa, 110.0);
        assert!(candidate.justifications[0].contains("Score 12.0"));
        assert!(candidate.justifications[1].contains("within 120%"));
        assert!(candidate.justifications[2].starts_with("Active"));
        assert_eq!(candidate.playbook.len(), 4);

        let low_score = ad("Cheap", 9.0, Some(50.0), ActivityTier::Active);
        assert!(scale_candidate(&low_score, 100.0, &config).is_none());

        let no_cpa = ad("Unknown", 40.0, None, ActivityTier::Active);
        assert!(scale_candidate(&no_cpa, 100.0, &config).is_none());
    }

    #[test]
    fn scale_boundary_is_inclusive() {
        let config = ReportConfig::default();
        let edge = ad("Edge", 10.0, Some(120.0), ActivityTier::Spending);
        assert!(scale_candidate(&edge, 100.0, &config).is_some());

        let over = ad("Over", 10.0, Some(120.5), ActivityTier::Spending);
        assert!(scale_candidate(&over, 100.0, &config).is_none());
    }

    #[test]
    fn scale_candidates_sort_by_score_then_cpa_then_name() {
        let config = ReportConfig::default();
        let ads = vec![
            ad("b", 15.0, Some(90.0), ActivityTier::Active),
            ad("a", 15.0, Some(90.0), ActivityTier::Active),
            ad("c", 15.0, Some(60.0), ActivityTier::Active),
            ad("d", 30.0, Some(110.0), ActivityTier::Active),
        ];
        let names = scale_candidates(&ads, 100.0, &config)
            .into_iter()
            .map(|candidate| candidate.name)
            .collect::<Vec<String>>();

        assert_eq!(names, vec!["d", "c", "a", "b"]);
    }

    #[test]
    fn pause_fires_above_one_and_a_half_median() {
        let config = ReportConfig::default();

        let expensive = ad("Burner", 5.0, Some(160.0), ActivityTier::Spending);
        let action = urgent_action(&expensive, 100.0, &config).expect("should pause");
        assert_eq!(action.kind, ActionKind::Pause);
        assert!(action.reason.contains("1.6x"));

        let tolerable = ad("Okay", 5.0, Some(140.0), ActivityTier::Spending);
        assert!(urgent_action(&tolerable, 100.0, &config).is_none());

        let edge = ad("Edge", 5.0, Some(150.0), ActivityTier::Active);
        assert!(urgent_action(&edge, 100.0, &config).is_none());

        let idle = ad("Idle", 5.0, Some(400.0), ActivityTier::Inactive);
        assert!(urgent_action(&idle, 100.0, &config).is_none());
    }

    #[test]
    fn review_fires_for_recent_spend_without_conversions() {
        let config = ReportConfig::default();
        let mut stalled = ad("Stalled", 5.0, Some(90.0), ActivityTier::Spending);
        stalled.spend_7d = 300.0;

        let action = urgent_action(&stalled, 100.0, &config).expect("should review");
        assert_eq!(action.kind, ActionKind::Review);
        assert!(action.reason.contains("300"));

        stalled.score_7d = 1.0;
        assert!(urgent_action(&stalled, 100.0, &config).is_none());
    }

    #[test]
    fn no_action_without_spend_or_median() {
        let config = ReportConfig::default();
        let mut unfunded = ad("Unfunded", 0.0, None, ActivityTier::Spending);
        unfunded.spend = 0.0;
        unfunded.spend_7d = 50.0;
        assert!(urgent_action(&unfunded, 100.0, &config).is_none());

        let no_median = ad("Lonely", 3.0, Some(999.0), ActivityTier::Spending);
        assert!(urgent_action(&no_median, 0.0, &config).is_none());
    }

    #[test]
    fn pause_actions_are_listed_before_reviews() {
        let config = ReportConfig::default();
        let mut review = ad("Review me", 2.0, Some(90.0), ActivityTier::Spending);
        review.spend_7d = 20.0;
        let pause = ad("Pause me", 2.0, Some(500.0), ActivityTier::Active);

        let actions = urgent_actions(&[review, pause], 100.0, &config);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::Pause);
        assert_eq!(actions[1].kind, ActionKind::Review);
    }
}
