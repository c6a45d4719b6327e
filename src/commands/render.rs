use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use super::load::load_report;
use crate::cli::RenderArgs;
use crate::report::{RankingItem, Report, ReportConfig, Verdict};
use crate::util::{format_cpa, format_money, now_utc_string, write_json_stdout};

#[derive(Debug, Serialize)]
struct RenderEnvelope<'a> {
    rendered_at: String,
    source_path: String,
    source_sha256: &'a str,
    report: &'a Report,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = ReportConfig::load(args.thresholds_path.as_deref())?;
    let loaded = load_report(&args.input, &config)?;

    if args.json {
        return write_json_stdout(&RenderEnvelope {
            rendered_at: now_utc_string(),
            source_path: args.input.display().to_string(),
            source_sha256: &loaded.source_sha256,
            report: &loaded.report,
        });
    }

    write_text_report(&loaded.report, &config)
}

fn write_text_report(report: &Report, config: &ReportConfig) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    let summary = &report.summary;

    writeln!(
        output,
        "Client: {}\tgenerated: {}\tversion: {}",
        display_or_dash(&report.meta.client),
        display_or_dash(&report.meta.generated_at),
        display_or_dash(&report.meta.version),
    )?;
    writeln!(
        output,
        "Spend: {}\tCPA: {} (median {})\tScore: {:.1}",
        format_money(summary.total_spend),
        format_money(summary.global_cpa),
        format_money(report.median_cpa),
        summary.total_score,
    )?;
    writeln!(
        output,
        "Ads: {} ({} converted)\tactive={} spending={} inactive={} no_data_7d={}",
        summary.total_ads,
        summary.ads_with_conversions,
        summary.activity.active,
        summary.activity.spending,
        summary.activity.inactive,
        summary.activity.no_data_7d,
    )?;

    write_ranking(&mut output, "Impact", &report.rankings.impact)?;
    write_ranking(&mut output, "Volume", &report.rankings.volume)?;
    write_ranking(&mut output, "Efficiency", &report.rankings.efficiency)?;

    let counts = report.action_counts();
    writeln!(output, "\nScale candidates: {}", counts.scale)?;
    if report.scale_candidates.is_empty() {
        writeln!(
            output,
            "\tnone (needs score >= {:.0} and CPA <= {})",
            config.scale_min_score,
            format_money(report.median_cpa * config.scale_max_cpa_ratio)
        )?;
    }
    for (rank, candidate) in report.scale_candidates.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\tscore={:.1}\tcpa={}\tspend={}\t{}",
            rank + 1,
            candidate.name,
            candidate.score,
            format_money(candidate.cpa),
            format_money(candidate.spend),
            candidate.activity_tier.as_str(),
        )?;
        for justification in &candidate.justifications {
            writeln!(output, "\t- {justification}")?;
        }
    }

    writeln!(
        output,
        "\nUrgent actions: {} (pause={} review={})",
        report.urgent_actions.len(),
        counts.pause,
        counts.review
    )?;
    for action in &report.urgent_actions {
        writeln!(output, "{}\t{}", action.kind.as_str(), action.name)?;
        writeln!(output, "\treason: {}", action.reason)?;
        writeln!(output, "\taction: {}", action.action)?;
    }

    if let Some(comparison) = &report.manager_comparison {
        writeln!(
            output,
            "\nCohorts: {} cpa={} vs {} cpa={}\t{}",
            comparison.primary_cohort,
            format_money(comparison.primary.cpa),
            comparison.baseline_cohort,
            format_money(comparison.baseline.cpa),
            verdict_label(comparison.verdict, comparison.delta_pct),
        )?;
    }

    if let Some(trend) = &report.history_trend {
        writeln!(
            output,
            "\nHistory: {} periods\tavg={:.1} max={:.1} min={:.1}\tchange={:+.0}% ({:?})",
            trend.periods,
            trend.average_score,
            trend.max_score,
            trend.min_score,
            trend.change_pct,
            trend.direction,
        )?;
    }

    if !report.glossary.is_empty() {
        writeln!(output, "\nGlossary:")?;
        for (term, entry) in &report.glossary {
            writeln!(output, "{term}\t{}: {}", entry.name, entry.description)?;
            if let Some(interpretation) = &entry.interpretation {
                writeln!(output, "\t{interpretation}")?;
            }
            for (category, description) in entry.categories.iter().flatten() {
                writeln!(output, "\t{category}: {description}")?;
            }
        }
    }

    output.flush()?;
    Ok(())
}

fn write_ranking(output: &mut impl Write, label: &str, items: &[RankingItem]) -> Result<()> {
    writeln!(output, "\nTop by {label}:")?;
    if items.is_empty() {
        writeln!(output, "\tnot enough data for this ranking")?;
        return Ok(());
    }

    for (rank, item) in items.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\tscore={:.1}\tcpa={}\tspend={}\t{}{}",
            rank + 1,
            item.name,
            item.score,
            format_cpa(item.cpa),
            format_money(item.spend),
            item.activity_tier.as_str(),
            item.efficiency_tier
                .map(|tier| format!(" {}", tier.as_str()))
                .unwrap_or_default(),
        )?;
    }
    Ok(())
}

pub(super) fn verdict_label(verdict: Verdict, delta_pct: f64) -> String {
    match verdict {
        Verdict::Better => format!("{delta_pct:.1}% more CPA-efficient"),
        Verdict::Worse => format!("{delta_pct:.1}% less CPA-efficient"),
        Verdict::Equal => "similar CPA".to_string(),
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
