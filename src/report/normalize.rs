use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use super::model::{ActivityTier, EfficiencyTier};

/// Accepted input keys per canonical field, tried in order. Upstream
/// pipeline versions renamed fields over time; new aliases go here.
pub struct AdFieldAliases {
    pub name: &'static [&'static str],
    pub spend: &'static [&'static str],
    pub cpa: &'static [&'static str],
    pub score: &'static [&'static str],
    pub score_7d: &'static [&'static str],
    pub spend_7d: &'static [&'static str],
    pub efficiency_tier: &'static [&'static str],
    pub activity_tier: &'static [&'static str],
}

pub const AD_FIELD_ALIASES: AdFieldAliases = AdFieldAliases {
    name: &["nombre", "ad_name", "Nombre del anuncio"],
    spend: &["gasto", "spend"],
    cpa: &["cpa"],
    score: &["score"],
    score_7d: &["score_7d"],
    spend_7d: &["gasto_7d"],
    efficiency_tier: &["eficiencia"],
    activity_tier: &["actividad"],
};

/// Ad record after alias resolution and numeric coercion, before the
/// portfolio-relative classification step. Tiers stay optional so the
/// classifier can tell "supplied upstream" from "missing".
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAd {
    pub name: String,
    pub spend: f64,
    pub cpa: Option<f64>,
    pub score: f64,
    pub score_7d: f64,
    pub spend_7d: f64,
    pub efficiency_tier: Option<EfficiencyTier>,
    pub activity_tier: Option<ActivityTier>,
}

/// Loosely-typed per-ad input record. Non-object entries behave like an
/// empty record.
#[derive(Debug, Clone, Copy)]
pub struct RawAd<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawAd<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    fn first<T>(&self, keys: &[&str], extract: impl Fn(&'a Value) -> Option<T>) -> Option<T> {
        let fields = self.fields?;
        keys.iter()
            .filter_map(|key| fields.get(*key))
            .find_map(extract)
    }
}

pub fn normalize_ads(raw: &[Value]) -> Vec<NormalizedAd> {
    let mut ads = raw
        .iter()
        .enumerate()
        .map(|(index, value)| normalize_ad(index, RawAd::new(value)))
        .collect::<Vec<NormalizedAd>>();

    disambiguate_names(&mut ads);
    ads
}

fn normalize_ad(index: usize, raw: RawAd<'_>) -> NormalizedAd {
    let aliases = &AD_FIELD_ALIASES;

    let name = raw
        .first(aliases.name, coerce_name)
        .unwrap_or_else(|| format!("Ad {}", index + 1));

    let efficiency_tier = raw.first(aliases.efficiency_tier, |value| {
        value.as_str().and_then(EfficiencyTier::from_wire)
    });
    let activity_tier = raw.first(aliases.activity_tier, |value| {
        value.as_str().and_then(ActivityTier::from_wire)
    });

    let ad = NormalizedAd {
        spend: raw.first(aliases.spend, coerce_number).unwrap_or(0.0).max(0.0),
        cpa: raw.first(aliases.cpa, native_cpa),
        score: raw.first(aliases.score, coerce_number).unwrap_or(0.0),
        score_7d: raw.first(aliases.score_7d, coerce_number).unwrap_or(0.0),
        spend_7d: raw
            .first(aliases.spend_7d, coerce_number)
            .unwrap_or(0.0)
            .max(0.0),
        efficiency_tier,
        activity_tier,
        name,
    };

    debug!(
        index,
        name = %ad.name,
        has_cpa = ad.cpa.is_some(),
        efficiency_supplied = ad.efficiency_tier.is_some(),
        activity_supplied = ad.activity_tier.is_some(),
        "normalized ad"
    );
    ad
}

/// Native numbers pass through; strings go through numeric parsing. Anything
/// non-finite or unparseable is rejected so the caller's default applies.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// CPA only counts when it is a native, positive, finite number. Zero is the
/// pipeline's old "no conversions" sentinel and maps to absent.
fn native_cpa(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|cpa| cpa.is_finite() && *cpa > 0.0)
}

fn coerce_name(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn disambiguate_names(ads: &mut [NormalizedAd]) {
    let mut seen = HashSet::with_capacity(ads.len());
    for ad in ads.iter_mut() {
        if seen.insert(ad.name.clone()) {
            continue;
        }

        let mut suffix = 2_usize;
        loop {
            let candidate = format!("{} ({suffix})", ad.name);
            if seen.insert(candidate.clone()) {
                debug!(original = %ad.name, renamed = %candidate, "duplicate ad name");
                ad.name = candidate;
                break;
            }
            suffix += 1;
        }
    }
}
