use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::classify::{classify_ad, median, scale_candidates, urgent_actions};
use super::config::ReportConfig;
use super::history::{history_trend, parse_history};
use super::managers::{compare_managers, parse_cohorts};
use super::model::{Ad, GlossaryEntry, RankingItem, Rankings, Report, ReportMeta};
use super::normalize::{NormalizedAd, normalize_ads};
use super::ranking::{build_rankings, rank_by_efficiency, rank_by_impact, rank_by_volume};
use super::schema::{RawDocument, parse_document, validate_document};
use super::summary::{reconcile, summarize};
use crate::error::SchemaError;

/// Bytes in, report out. The only hard failures are invalid JSON and a bad
/// top-level shape.
pub fn build_report(bytes: &[u8], config: &ReportConfig) -> Result<Report, SchemaError> {
    let value = parse_document(bytes)?;
    assemble_report(&value, config)
}

pub fn assemble_report(value: &Value, config: &ReportConfig) -> Result<Report, SchemaError> {
    let document = validate_document(value)?;

    let normalized = normalize_ads(document.ads);
    let median_cpa = resolve_median_cpa(&document, &normalized);
    let ads = normalized
        .into_iter()
        .map(|ad| classify_ad(ad, median_cpa, config))
        .collect::<Vec<Ad>>();

    let summary = summarize(&ads);
    reconcile(document.summary, &summary);

    let rankings = resolve_rankings(&document, &ads, config.ranking_size);
    let scale_candidates = precomputed(&document, "duplicar")
        .unwrap_or_else(|| scale_candidates(&ads, median_cpa, config));
    let urgent_actions = precomputed(&document, "acciones_urgentes")
        .unwrap_or_else(|| urgent_actions(&ads, median_cpa, config));

    let history = document.section("historico").and_then(parse_history);
    let history_trend = history
        .as_deref()
        .and_then(|periods| history_trend(periods, config.history_trend_pct));

    let managers = document
        .section("comparativa_managers")
        .and_then(parse_cohorts);
    let manager_comparison = managers
        .as_ref()
        .and_then(|cohorts| compare_managers(cohorts, config));

    let report = Report {
        meta: parse_meta(document.meta),
        summary,
        median_cpa,
        rankings,
        scale_candidates,
        urgent_actions,
        ads,
        history,
        history_trend,
        glossary: document
            .section("glosario")
            .map(parse_glossary)
            .unwrap_or_default(),
        managers,
        manager_comparison,
    };

    info!(
        client = %report.meta.client,
        ads = report.ads.len(),
        median_cpa = report.median_cpa,
        scale_candidates = report.scale_candidates.len(),
        urgent_actions = report.urgent_actions.len(),
        manager_comparison = report.manager_comparison.is_some(),
        "assembled report"
    );
    Ok(report)
}

/// Top-level `mediana_cpa`, then `resumen.mediana_cpa`, then the median of
/// the ads' own CPAs.
fn resolve_median_cpa(document: &RawDocument<'_>, ads: &[NormalizedAd]) -> f64 {
    let supplied = document
        .section("mediana_cpa")
        .or_else(|| document.summary.get("mediana_cpa"))
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && *value > 0.0);

    supplied.unwrap_or_else(|| median(ads.iter().filter_map(|ad| ad.cpa)))
}

fn resolve_rankings(document: &RawDocument<'_>, ads: &[Ad], limit: usize) -> Rankings {
    let Some(supplied) = document.section("rankings").and_then(Value::as_object) else {
        return build_rankings(ads, limit);
    };
    let list = |key: &str| -> Option<Vec<RankingItem>> {
        let raw = supplied.get(key).filter(|value| !value.is_null())?;
        decode_section::<Vec<RankingItem>>(key, raw).map(|items| {
            items
                .into_iter()
                .map(|mut item| {
                    item.cpa = item.cpa.filter(|cpa| cpa.is_finite() && *cpa > 0.0);
                    item
                })
                .collect()
        })
    };

    Rankings {
        impact: list("impacto").unwrap_or_else(|| rank_by_impact(ads, limit)),
        volume: list("volumen").unwrap_or_else(|| rank_by_volume(ads, limit)),
        efficiency: list("eficiencia").unwrap_or_else(|| rank_by_efficiency(ads, limit)),
    }
}

fn precomputed<T: DeserializeOwned>(document: &RawDocument<'_>, key: &str) -> Option<T> {
    document
        .section(key)
        .and_then(|raw| decode_section(key, raw))
}

fn decode_section<T: DeserializeOwned>(key: &str, raw: &Value) -> Option<T> {
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(section = key, error = %err, "malformed pre-computed section; deriving instead");
            None
        }
    }
}

fn parse_meta(meta: &Map<String, Value>) -> ReportMeta {
    let text = |key: &str| -> Option<String> {
        match meta.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    };

    let generated_at = text("fecha_generacion")
        .or_else(|| {
            text("fecha").map(|date| match text("hora") {
                Some(time) => format!("{date} {time}"),
                None => date,
            })
        })
        .unwrap_or_default();

    ReportMeta {
        client: text("cliente").or_else(|| text("client")).unwrap_or_default(),
        generated_at,
        version: text("version").unwrap_or_default(),
    }
}

fn parse_glossary(value: &Value) -> BTreeMap<String, GlossaryEntry> {
    let Some(entries) = value.as_object() else {
        warn!(section = "glosario", "section is not an object; ignoring");
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(term, raw)| {
            match serde_json::from_value::<GlossaryEntry>(raw.clone()) {
                Ok(entry) => Some((term.clone(), entry)),
                Err(err) => {
                    warn!(term = %term, error = %err, "skipping malformed glossary entry");
                    None
                }
            }
        })
        .collect()
}
