use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EfficiencyTier {
    #[serde(rename = "VERY_EFFICIENT", alias = "MUY_EFICIENTE")]
    VeryEfficient,
    #[serde(rename = "EFFICIENT", alias = "EFICIENTE")]
    Efficient,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "EXPENSIVE", alias = "CARO")]
    Expensive,
    #[default]
    #[serde(rename = "NO_DATA", alias = "SIN_DATOS")]
    NoData,
}

impl EfficiencyTier {
    /// Accepts both the pipeline's Spanish labels and the English tags.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "MUY_EFICIENTE" | "VERY_EFFICIENT" => Some(Self::VeryEfficient),
            "EFICIENTE" | "EFFICIENT" => Some(Self::Efficient),
            "NORMAL" => Some(Self::Normal),
            "CARO" | "EXPENSIVE" => Some(Self::Expensive),
            "SIN_DATOS" | "NO_DATA" => Some(Self::NoData),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryEfficient => "VERY_EFFICIENT",
            Self::Efficient => "EFFICIENT",
            Self::Normal => "NORMAL",
            Self::Expensive => "EXPENSIVE",
            Self::NoData => "NO_DATA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActivityTier {
    #[serde(rename = "ACTIVE", alias = "ACTIVO")]
    Active,
    #[serde(rename = "SPENDING", alias = "GASTANDO")]
    Spending,
    #[serde(rename = "INACTIVE", alias = "INACTIVO")]
    Inactive,
    #[default]
    #[serde(rename = "NO_DATA_7D", alias = "SIN_DATOS_7D")]
    NoData7d,
}

impl ActivityTier {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "ACTIVO" | "ACTIVE" => Some(Self::Active),
            "GASTANDO" | "SPENDING" => Some(Self::Spending),
            "INACTIVO" | "INACTIVE" => Some(Self::Inactive),
            "SIN_DATOS_7D" | "NO_DATA_7D" => Some(Self::NoData7d),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Spending => "SPENDING",
            Self::Inactive => "INACTIVE",
            Self::NoData7d => "NO_DATA_7D",
        }
    }

    /// True when the ad spent money during the trailing window.
    pub fn is_spending(self) -> bool {
        matches!(self, Self::Active | Self::Spending)
    }
}

/// Canonical advertisement record. `cpa` is `None` when the ad had no
/// conversions; it is never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ad {
    pub name: String,
    pub spend: f64,
    pub cpa: Option<f64>,
    pub score: f64,
    pub score_7d: f64,
    pub spend_7d: f64,
    pub efficiency_tier: EfficiencyTier,
    pub activity_tier: ActivityTier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityBreakdown {
    pub active: usize,
    pub spending: usize,
    pub inactive: usize,
    pub no_data_7d: usize,
}

impl ActivityBreakdown {
    pub fn total(&self) -> usize {
        self.active + self.spending + self.inactive + self.no_data_7d
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EfficiencyBreakdown {
    pub very_efficient: usize,
    pub efficient: usize,
    pub normal: usize,
    pub expensive: usize,
    pub no_data: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_spend: f64,
    pub total_score: f64,
    pub global_cpa: f64,
    pub total_ads: usize,
    pub ads_with_conversions: usize,
    pub activity: ActivityBreakdown,
    pub efficiency: EfficiencyBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingItem {
    #[serde(alias = "ad_name", alias = "nombre")]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub cpa: Option<f64>,
    #[serde(default, alias = "gasto")]
    pub spend: f64,
    #[serde(default, alias = "actividad")]
    pub activity_tier: ActivityTier,
    #[serde(default, alias = "eficiencia")]
    pub efficiency_tier: Option<EfficiencyTier>,
}

impl RankingItem {
    pub fn from_ad(ad: &Ad) -> Self {
        Self {
            name: ad.name.clone(),
            score: ad.score,
            cpa: ad.cpa,
            spend: ad.spend,
            activity_tier: ad.activity_tier,
            efficiency_tier: Some(ad.efficiency_tier),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    pub impact: Vec<RankingItem>,
    pub volume: Vec<RankingItem>,
    pub efficiency: Vec<RankingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleCandidate {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    pub cpa: f64,
    #[serde(default, alias = "gasto")]
    pub spend: f64,
    #[serde(default, alias = "actividad")]
    pub activity_tier: ActivityTier,
    #[serde(default, alias = "razones")]
    pub justifications: Vec<String>,
    #[serde(default, alias = "acciones")]
    pub playbook: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "PAUSE", alias = "PAUSAR")]
    Pause,
    #[serde(rename = "REVIEW", alias = "REVISAR")]
    Review,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pause => "PAUSE",
            Self::Review => "REVIEW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentAction {
    #[serde(alias = "tipo")]
    pub kind: ActionKind,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "razon")]
    pub reason: String,
    #[serde(default, alias = "accion")]
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagerMetrics {
    pub spend: f64,
    /// Cumulative score of the cohort.
    pub conversions: f64,
    pub cpa: f64,
    /// Average 0-100 quality score.
    pub average_quality: f64,
    pub ad_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "MEJOR")]
    Better,
    #[serde(rename = "PEOR")]
    Worse,
    #[serde(rename = "IGUAL")]
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerComparison {
    pub primary_cohort: String,
    pub baseline_cohort: String,
    pub primary: ManagerMetrics,
    pub baseline: ManagerMetrics,
    pub verdict: Verdict,
    /// Relative CPA gap in percent; always 0 for `Verdict::Equal`.
    pub delta_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPeriod {
    #[serde(alias = "periodo")]
    pub period: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryTrend {
    pub periods: usize,
    pub average_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub change_pct: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "interpretacion", skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    #[serde(default, alias = "categorias", skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    pub client: String,
    pub generated_at: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdSortColumn {
    Score,
    Cpa,
    Spend,
    Score7d,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub pause: usize,
    pub review: usize,
    pub scale: usize,
}

/// Fully assembled report. Built once per input document and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub summary: Summary,
    pub median_cpa: f64,
    pub rankings: Rankings,
    pub scale_candidates: Vec<ScaleCandidate>,
    pub urgent_actions: Vec<UrgentAction>,
    pub ads: Vec<Ad>,
    pub history: Option<Vec<HistoryPeriod>>,
    pub history_trend: Option<HistoryTrend>,
    pub glossary: BTreeMap<String, GlossaryEntry>,
    pub managers: Option<BTreeMap<String, ManagerMetrics>>,
    pub manager_comparison: Option<ManagerComparison>,
}

impl Report {
    pub fn ad(&self, name: &str) -> Option<&Ad> {
        self.ads.iter().find(|ad| ad.name == name)
    }

    /// Ads ordered for the table view. Ads without a CPA always sort last
    /// when ordering by CPA, whichever the direction.
    pub fn ads_sorted(&self, column: AdSortColumn, ascending: bool) -> Vec<&Ad> {
        let mut ads = self.ads.iter().collect::<Vec<&Ad>>();
        ads.sort_by(|a, b| {
            let primary = match column {
                AdSortColumn::Score => directed(a.score.total_cmp(&b.score), ascending),
                AdSortColumn::Spend => directed(a.spend.total_cmp(&b.spend), ascending),
                AdSortColumn::Score7d => directed(a.score_7d.total_cmp(&b.score_7d), ascending),
                AdSortColumn::Cpa => match (a.cpa, b.cpa) {
                    (Some(left), Some(right)) => directed(left.total_cmp(&right), ascending),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
            };
            primary.then_with(|| a.name.cmp(&b.name))
        });
        ads
    }

    pub fn action_counts(&self) -> ActionCounts {
        let pause = self
            .urgent_actions
            .iter()
            .filter(|action| action.kind == ActionKind::Pause)
            .count();
        ActionCounts {
            pause,
            review: self.urgent_actions.len() - pause,
            scale: self.scale_candidates.len(),
        }
    }
}

fn directed(ordering: Ordering, ascending: bool) -> Ordering {
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}
