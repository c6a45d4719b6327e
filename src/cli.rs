use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::report::AdSortColumn;

#[derive(Parser, Debug)]
#[command(
    name = "adreport",
    version,
    about = "Normalize and classify pre-computed ad performance reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Validate(ValidateArgs),
    Render(RenderArgs),
    Ads(AdsArgs),
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub thresholds_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortColumn {
    Score,
    Cpa,
    Spend,
    #[value(name = "score-7d")]
    Score7d,
}

impl From<SortColumn> for AdSortColumn {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Score => Self::Score,
            SortColumn::Cpa => Self::Cpa,
            SortColumn::Spend => Self::Spend,
            SortColumn::Score7d => Self::Score7d,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AdsArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub thresholds_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = SortColumn::Score)]
    pub sort_by: SortColumn,

    #[arg(long, default_value_t = false)]
    pub ascending: bool,

    #[arg(long)]
    pub limit: Option<usize>,

    /// Show a single ad by its canonical name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub thresholds_path: Option<PathBuf>,

    #[arg(long)]
    pub primary_cohort: Option<String>,

    #[arg(long)]
    pub baseline_cohort: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ads_defaults_to_score_descending() {
        let cli = Cli::try_parse_from(["adreport", "ads", "--input", "report.json"])
            .expect("ads args should parse");
        let Commands::Ads(args) = cli.command else {
            panic!("expected ads command");
        };
        assert_eq!(args.sort_by, SortColumn::Score);
        assert!(!args.ascending);
        assert!(args.limit.is_none());
    }

    #[test]
    fn sort_column_accepts_score_7d() {
        let cli = Cli::try_parse_from([
            "adreport", "ads", "--input", "r.json", "--sort-by", "score-7d", "--ascending",
        ])
        .expect("ads args should parse");
        let Commands::Ads(args) = cli.command else {
            panic!("expected ads command");
        };
        assert_eq!(args.sort_by, SortColumn::Score7d);
        assert!(args.ascending);
    }

    #[test]
    fn render_requires_input() {
        assert!(Cli::try_parse_from(["adreport", "render"]).is_err());
    }
}
