use std::io::{self, Write};

use anyhow::{Result, bail};

use super::load::load_report;
use crate::cli::AdsArgs;
use crate::report::{Ad, ReportConfig};
use crate::util::{format_cpa, format_money, write_json_stdout};

pub fn run(args: AdsArgs) -> Result<()> {
    let config = ReportConfig::load(args.thresholds_path.as_deref())?;
    let loaded = load_report(&args.input, &config)?;
    let report = &loaded.report;

    let ads = match &args.name {
        Some(name) => match report.ad(name) {
            Some(ad) => vec![ad],
            None => bail!("no ad named {name:?} in {}", args.input.display()),
        },
        None => {
            let mut sorted = report.ads_sorted(args.sort_by.into(), args.ascending);
            if let Some(limit) = args.limit {
                sorted.truncate(limit);
            }
            sorted
        }
    };

    if args.json {
        return write_json_stdout(&ads);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_ad_table(&mut output, &ads)?;
    output.flush()?;
    Ok(())
}

fn write_ad_table(output: &mut impl Write, ads: &[&Ad]) -> Result<()> {
    writeln!(
        output,
        "name\tspend\tcpa\tscore\tscore_7d\tspend_7d\tefficiency\tactivity"
    )?;
    for ad in ads {
        writeln!(
            output,
            "{}\t{}\t{}\t{:.1}\t{:.1}\t{}\t{}\t{}",
            ad.name,
            format_money(ad.spend),
            format_cpa(ad.cpa),
            ad.score,
            ad.score_7d,
            format_money(ad.spend_7d),
            ad.efficiency_tier.as_str(),
            ad.activity_tier.as_str(),
        )?;
    }
    Ok(())
}
