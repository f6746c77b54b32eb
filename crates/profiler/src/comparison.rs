use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result};
use crate::risk_scoring::RiskScore;
use crate::wallet_metrics::WalletMetrics;

pub const NO_PEERS_SUMMARY: &str = "No similar wallets to compare";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePosition {
    SignificantlyAbove,
    Above,
    Average,
    Below,
    SignificantlyBelow,
}

impl RelativePosition {
    pub fn from_percent_diff(diff_percent: i64) -> Self {
        if diff_percent > 20 {
            Self::SignificantlyAbove
        } else if diff_percent > 5 {
            Self::Above
        } else if diff_percent < -20 {
            Self::SignificantlyBelow
        } else if diff_percent < -5 {
            Self::Below
        } else {
            Self::Average
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPosition {
    MoreAggressive,
    SlightlyAggressive,
    Similar,
    SlightlyConservative,
    MoreConservative,
}

impl RiskPosition {
    /// Banded on the absolute score difference, not a percentage.
    pub fn from_diff(diff: f64) -> Self {
        if diff > 2.0 {
            Self::MoreAggressive
        } else if diff > 0.5 {
            Self::SlightlyAggressive
        } else if diff < -2.0 {
            Self::MoreConservative
        } else if diff < -0.5 {
            Self::SlightlyConservative
        } else {
            Self::Similar
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionComparison<P> {
    pub user: f64,
    pub average: f64,
    pub diff: f64,
    pub diff_percent: i64,
    pub position: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Strength,
    Weakness,
    Warning,
    Opportunity,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonInsight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub category: String,
    pub message: String,
    pub icon: String,
}

impl ComparisonInsight {
    fn new(insight_type: InsightType, category: &str, message: String, icon: &str) -> Self {
        Self {
            insight_type,
            category: category.to_string(),
            message,
            icon: icon.to_string(),
        }
    }
}

/// A similar wallet as loaded by the caller. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CohortMember {
    pub address: String,
    pub similarity: f64,
    pub risk_score: Option<f64>,
    pub portfolio_value: Option<f64>,
    pub metrics: Option<WalletMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub portfolio_value: DimensionComparison<RelativePosition>,
    pub risk_score: DimensionComparison<RiskPosition>,
    pub chains: DimensionComparison<RelativePosition>,
    pub positions: DimensionComparison<RelativePosition>,
    pub transactions: DimensionComparison<RelativePosition>,
    pub insights: Vec<ComparisonInsight>,
    pub similar_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    NoPeers { summary: String, positioning: String },
    Compared(Box<ComparisonResult>),
}

impl ComparisonOutcome {
    fn no_peers() -> Self {
        Self::NoPeers {
            summary: NO_PEERS_SUMMARY.to_string(),
            positioning: "neutral".to_string(),
        }
    }
}

/// Half-up rounding, also for negatives: -2.5 rounds to -2.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn round2(x: f64) -> f64 {
    round_half_up(x * 100.0) / 100.0
}

/// Mean of the finite values, rounded to 2 decimals. 0 when none are present.
fn average(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (sum, n) = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        round2(sum / f64::from(n))
    }
}

pub fn percent_diff(value: f64, average: f64) -> i64 {
    if average == 0.0 {
        return if value > 0.0 { 100 } else { 0 };
    }
    round_half_up((value - average) / average * 100.0) as i64
}

fn dimension<P>(
    field: &'static str,
    user: f64,
    average: f64,
    position: impl Fn(f64, i64) -> P,
) -> Result<DimensionComparison<P>> {
    let user = ensure_finite(field, user)?;
    let diff = ensure_finite(field, user - average)?;
    let diff_percent = percent_diff(user, average);
    Ok(DimensionComparison {
        user,
        average,
        diff,
        diff_percent,
        position: position(diff, diff_percent),
    })
}

fn relative(field: &'static str, user: f64, average: f64) -> Result<DimensionComparison<RelativePosition>> {
    dimension(field, user, average, |_, pct| RelativePosition::from_percent_diff(pct))
}

/// `{:.N}` after half-up rounding, so 2.25 prints as "2.3".
fn fixed(x: f64, decimals: i32) -> String {
    let scale = 10f64.powi(decimals);
    let rounded = round_half_up(x * scale) / scale;
    format!("{rounded:.prec$}", prec = usize::try_from(decimals).unwrap_or(0))
}

fn portfolio_insight(d: &DimensionComparison<RelativePosition>) -> Option<ComparisonInsight> {
    let pct = d.diff_percent.abs();
    match d.position {
        RelativePosition::SignificantlyAbove => Some(ComparisonInsight::new(
            InsightType::Strength,
            "portfolio_value",
            format!("Your portfolio value is {pct}% above similar traders"),
            "📈",
        )),
        RelativePosition::SignificantlyBelow => Some(ComparisonInsight::new(
            InsightType::Opportunity,
            "portfolio_value",
            format!("Similar traders have {pct}% larger portfolios on average"),
            "💡",
        )),
        _ => None,
    }
}

fn risk_insight(d: &DimensionComparison<RiskPosition>) -> Option<ComparisonInsight> {
    match d.position {
        RiskPosition::MoreAggressive => Some(ComparisonInsight::new(
            InsightType::Warning,
            "risk",
            format!(
                "You're taking more risk than similar traders ({} vs {})",
                d.user,
                fixed(d.average, 1)
            ),
            "⚠️",
        )),
        RiskPosition::MoreConservative => Some(ComparisonInsight::new(
            InsightType::Strength,
            "risk",
            "You're more conservative than similar traders - lower risk profile".to_string(),
            "🛡️",
        )),
        _ => None,
    }
}

fn chain_insight(d: &DimensionComparison<RelativePosition>) -> Option<ComparisonInsight> {
    match d.position {
        RelativePosition::SignificantlyAbove => Some(ComparisonInsight::new(
            InsightType::Strength,
            "diversity",
            format!(
                "You're more diversified across chains than similar traders ({} vs {})",
                d.user,
                fixed(d.average, 1)
            ),
            "🌐",
        )),
        RelativePosition::SignificantlyBelow => Some(ComparisonInsight::new(
            InsightType::Opportunity,
            "diversity",
            format!(
                "Consider expanding to more chains - similar traders use {} chains on average",
                fixed(d.average, 0)
            ),
            "🔗",
        )),
        _ => None,
    }
}

fn activity_insight(d: &DimensionComparison<RelativePosition>) -> Option<ComparisonInsight> {
    let pct = d.diff_percent.abs();
    match d.position {
        RelativePosition::SignificantlyAbove => Some(ComparisonInsight::new(
            InsightType::Strength,
            "activity",
            format!("You're {pct}% more active than similar traders"),
            "⚡",
        )),
        RelativePosition::SignificantlyBelow => Some(ComparisonInsight::new(
            InsightType::Info,
            "activity",
            format!("Similar traders are {pct}% more active on-chain"),
            "📊",
        )),
        _ => None,
    }
}

fn comparison_insights(result: &ComparisonResult) -> Vec<ComparisonInsight> {
    let mut insights: Vec<ComparisonInsight> = [
        portfolio_insight(&result.portfolio_value),
        risk_insight(&result.risk_score),
        chain_insight(&result.chains),
        activity_insight(&result.transactions),
    ]
    .into_iter()
    .flatten()
    .collect();

    if insights.is_empty() {
        insights.push(ComparisonInsight::new(
            InsightType::Info,
            "general",
            "Your portfolio metrics are similar to comparable traders".to_string(),
            "✅",
        ));
    }
    insights
}

/// Positions a wallet against its cohort of similar wallets.
///
/// Averages skip members that lack a value. A non-finite user value is an
/// error rather than a silently wrong comparison.
pub fn compare_with_cohort(
    user: &WalletMetrics,
    user_risk: RiskScore,
    cohort: &[CohortMember],
) -> Result<ComparisonOutcome> {
    if cohort.is_empty() {
        tracing::debug!("empty cohort, nothing to compare");
        return Ok(ComparisonOutcome::no_peers());
    }

    let peer_metrics = || cohort.iter().filter_map(|m| m.metrics.as_ref());

    let avg_value = average(cohort.iter().map(|m| m.portfolio_value));
    let avg_risk = average(cohort.iter().map(|m| m.risk_score));
    let avg_chains = average(peer_metrics().map(|m| Some(f64::from(m.chain_count))));
    let avg_positions = average(peer_metrics().map(|m| Some(f64::from(m.position_count))));
    let avg_txs = average(peer_metrics().map(|m| Some(f64::from(m.tx_count))));

    let mut result = ComparisonResult {
        portfolio_value: relative("portfolio value", user.total_value, avg_value)?,
        risk_score: dimension(
            "risk score",
            f64::from(user_risk.value()),
            avg_risk,
            |diff, _| RiskPosition::from_diff(diff),
        )?,
        chains: relative("chain count", f64::from(user.chain_count), avg_chains)?,
        positions: relative("position count", f64::from(user.position_count), avg_positions)?,
        transactions: relative("transaction count", f64::from(user.tx_count), avg_txs)?,
        insights: Vec::new(),
        similar_count: cohort.len(),
    };
    result.insights = comparison_insights(&result);

    metrics::counter!("profiler_comparisons_total").increment(1);
    tracing::debug!(
        similar_count = result.similar_count,
        insights = result.insights.len(),
        "cohort comparison complete"
    );

    Ok(ComparisonOutcome::Compared(Box::new(result)))
}
