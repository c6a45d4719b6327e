use anyhow::Result;
use tracing::info;

use super::load::load_report;
use super::render::verdict_label;
use crate::cli::CompareArgs;
use crate::report::ReportConfig;
use crate::util::{format_money, write_json_stdout};

pub fn run(args: CompareArgs) -> Result<()> {
    let mut config = ReportConfig::load(args.thresholds_path.as_deref())?;
    if let Some(primary) = args.primary_cohort {
        config.primary_cohort = primary;
    }
    if let Some(baseline) = args.baseline_cohort {
        config.baseline_cohort = baseline;
    }

    let loaded = load_report(&args.input, &config)?;
    let comparison = loaded.report.manager_comparison.as_ref();

    if args.json {
        return write_json_stdout(&comparison);
    }

    let Some(comparison) = comparison else {
        let cohorts = loaded
            .report
            .managers
            .as_ref()
            .map(|managers| managers.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        info!(
            primary = %config.primary_cohort,
            baseline = %config.baseline_cohort,
            available = ?cohorts,
            "cohort comparison unavailable"
        );
        println!("comparison unavailable");
        return Ok(());
    };

    println!("cohort\tspend\tconversions\tcpa\tquality\tads");
    for (name, metrics) in [
        (&comparison.primary_cohort, &comparison.primary),
        (&comparison.baseline_cohort, &comparison.baseline),
    ] {
        println!(
            "{name}\t{}\t{:.0}\t{}\t{:.1}\t{}",
            format_money(metrics.spend),
            metrics.conversions,
            format_money(metrics.cpa),
            metrics.average_quality,
            metrics.ad_count,
        );
    }
    println!(
        "{} vs {}: {}",
        comparison.primary_cohort,
        comparison.baseline_cohort,
        verdict_label(comparison.verdict, comparison.delta_pct)
    );
    Ok(())
}
