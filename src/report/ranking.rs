use std::cmp::Ordering;

use super::model::{Ad, RankingItem, Rankings};

pub fn rank_by_impact(ads: &[Ad], limit: usize) -> Vec<RankingItem> {
    top(ads.iter(), limit, |a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.spend.total_cmp(&a.spend))
    })
}

pub fn rank_by_volume(ads: &[Ad], limit: usize) -> Vec<RankingItem> {
    top(ads.iter(), limit, |a, b| {
        b.spend
            .total_cmp(&a.spend)
            .then_with(|| b.score.total_cmp(&a.score))
    })
}

/// Cheapest CPA first; ads without a CPA never rank here.
pub fn rank_by_efficiency(ads: &[Ad], limit: usize) -> Vec<RankingItem> {
    top(ads.iter().filter(|ad| ad.cpa.is_some()), limit, |a, b| {
        let cpa_a = a.cpa.unwrap_or(f64::INFINITY);
        let cpa_b = b.cpa.unwrap_or(f64::INFINITY);
        cpa_a
            .total_cmp(&cpa_b)
            .then_with(|| b.score.total_cmp(&a.score))
    })
}

pub fn build_rankings(ads: &[Ad], limit: usize) -> Rankings {
    Rankings {
        impact: rank_by_impact(ads, limit),
        volume: rank_by_volume(ads, limit),
        efficiency: rank_by_efficiency(ads, limit),
    }
}

fn top<'a>(
    ads: impl Iterator<Item = &'a Ad>,
    limit: usize,
    compare: impl Fn(&Ad, &Ad) -> Ordering,
) -> Vec<RankingItem> {
    let mut eligible = ads.collect::<Vec<&Ad>>();
    eligible.sort_by(|a, b| compare(a, b).then_with(|| a.name.cmp(&b.name)));
    eligible
        .into_iter()
        .take(limit)
        .map(RankingItem::from_ad)
        .collect()
}
