use serde_json::Value;
use tracing::warn;

use super::model::{HistoryPeriod, HistoryTrend, TrendDirection};
use super::normalize::coerce_number;

/// Reads `historico` entries in document order. Entries without a period
/// label are dropped; scores are coerced like ad fields.
pub fn parse_history(value: &Value) -> Option<Vec<HistoryPeriod>> {
    let Some(entries) = value.as_array() else {
        warn!(section = "historico", "section is not an array; ignoring");
        return None;
    };

    let periods = entries
        .iter()
        .filter_map(|entry| {
            let fields = entry.as_object()?;
            let period = fields
                .get("periodo")
                .or_else(|| fields.get("period"))
                .and_then(Value::as_str)?;
            let score = fields.get("score").and_then(coerce_number).unwrap_or(0.0);
            Some(HistoryPeriod {
                period: period.to_string(),
                score,
            })
        })
        .collect::<Vec<HistoryPeriod>>();

    if periods.len() != entries.len() {
        warn!(
            kept = periods.len(),
            dropped = entries.len() - periods.len(),
            "dropped history entries without a period label"
        );
    }
    Some(periods)
}

pub fn history_trend(periods: &[HistoryPeriod], band_pct: f64) -> Option<HistoryTrend> {
    let first = periods.first()?;
    let last = periods.last()?;

    let total = periods.iter().map(|period| period.score).sum::<f64>();
    let max_score = periods
        .iter()
        .map(|period| period.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_score = periods
        .iter()
        .map(|period| period.score)
        .fold(f64::INFINITY, f64::min);

    let change_pct = if first.score > 0.0 {
        (last.score - first.score) / first.score * 100.0
    } else {
        0.0
    };
    let direction = if change_pct > band_pct {
        TrendDirection::Improving
    } else if change_pct < -band_pct {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Some(HistoryTrend {
        periods: periods.len(),
        average_score: total / periods.len() as f64,
        max_score,
        min_score,
        change_pct,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn period(label: &str, score: f64) -> HistoryPeriod {
        HistoryPeriod {
            period: label.to_string(),
            score,
        }
    }

    #[test]
    fn parses_entries_in_order_and_drops_unlabeled() {
        let value = json!([
            { "periodo": "sep", "score": 40 },
            { "periodo": "oct", "score": "55.5" },
            { "score": 10 },
            { "periodo": "nov" },
        ]);

        let periods = parse_history(&value).expect("array section");
        assert_eq!(
            periods,
            vec![period("sep", 40.0), period("oct", 55.5), period("nov", 0.0)]
        );
        assert!(parse_history(&json!({ "sep": 1 })).is_none());
    }

    #[test]
    fn trend_reports_improvement_beyond_band() {
        let trend = history_trend(&[period("sep", 100.0), period("oct", 80.0), period("nov", 125.0)], 10.0)
            .expect("non-empty history");

        assert_eq!(trend.periods, 3);
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert!((trend.change_pct - 25.0).abs() < 1e-9);
        assert_eq!(trend.max_score, 125.0);
        assert_eq!(trend.min_score, 80.0);
        assert!((trend.average_score - 101.666_666).abs() < 1e-3);
    }

    #[test]
    fn trend_is_stable_inside_band_and_declining_below() {
        let stable = history_trend(&[period("a", 100.0), period("b", 105.0)], 10.0).expect("trend");
        assert_eq!(stable.direction, TrendDirection::Stable);

        let falling = history_trend(&[period("a", 100.0), period("b", 70.0)], 10.0).expect("trend");
        assert_eq!(falling.direction, TrendDirection::Declining);
    }

    #[test]
    fn zero_first_score_yields_no_change() {
        let trend = history_trend(&[period("a", 0.0), period("b", 50.0)], 10.0).expect("trend");
        assert_eq!(trend.change_pct, 0.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn empty_history_has_no_trend() {
        assert!(history_trend(&[], 10.0).is_none());
    }
}
