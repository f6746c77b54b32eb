use std::time::Instant;

use chrono::{DateTime, Utc};
use common::config::Config;
use common::types::{PortfolioSnapshot, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::comparison::{compare_with_cohort, CohortMember, ComparisonOutcome};
use crate::error::Result;
use crate::personality_classification::{classify_personality, Personality};
use crate::profile_bio::BioConfig;
use crate::risk_scoring::{compute_risk_score, RiskScore};
use crate::similarity::{find_similar, SimilarityCandidate, SimilarityConfig, SimilarityEdge, SimilarityVector};
use crate::wallet_insights::generate_insights;
use crate::wallet_metrics::{compute_wallet_metrics, AssetLookup, WalletMetrics};

/// Immutable settings shared by every analysis call.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub lookup: AssetLookup,
    pub similarity: SimilarityConfig,
    pub bio: BioConfig,
}

impl AnalysisContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lookup: AssetLookup::from_config(&config.asset_categories),
            similarity: SimilarityConfig::from_config(&config.similarity),
            bio: BioConfig::from_config(&config.profile),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAnalysis {
    pub address: String,
    pub personality: Personality,
    pub risk_score: RiskScore,
    pub metrics: WalletMetrics,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    /// Free text from an external writer. Never produced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl WalletAnalysis {
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    pub fn to_profile(&self) -> StoredProfile {
        StoredProfile {
            address: self.address.clone(),
            metrics: self.metrics.clone(),
            risk_score: self.risk_score,
            personality: self.personality,
            portfolio_value: self.metrics.total_value,
        }
    }
}

/// A previously analyzed wallet as the caller persisted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub address: String,
    pub metrics: WalletMetrics,
    pub risk_score: RiskScore,
    pub personality: Personality,
    pub portfolio_value: f64,
}

pub fn analyze_wallet(
    snapshot: &PortfolioSnapshot,
    history: &[TransactionRecord],
    lookup: &AssetLookup,
    now: DateTime<Utc>,
) -> WalletAnalysis {
    let start = Instant::now();
    tracing::info!(
        address = %snapshot.address,
        positions = snapshot.positions.len(),
        transactions = history.len(),
        "analysis started"
    );

    let wallet_metrics = compute_wallet_metrics(snapshot, history, lookup);
    if wallet_metrics.total_value <= 0.0 {
        tracing::warn!(address = %snapshot.address, "empty portfolio, using neutral defaults");
    }
    let personality = classify_personality(&wallet_metrics);
    let risk_score = compute_risk_score(&wallet_metrics);
    let insights = generate_insights(&wallet_metrics, personality, risk_score);

    let ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("profiler_analysis_duration_ms").record(ms);
    metrics::counter!("profiler_wallets_analyzed_total").increment(1);
    metrics::counter!("profiler_personality_total", "personality" => personality.as_str()).increment(1);

    tracing::info!(
        address = %snapshot.address,
        personality = personality.as_str(),
        risk_score = risk_score.value(),
        elapsed_ms = ms,
        "analysis complete"
    );

    WalletAnalysis {
        address: snapshot.address.clone(),
        personality,
        risk_score,
        metrics: wallet_metrics,
        strengths: insights.strengths,
        weaknesses: insights.weaknesses,
        recommendations: insights.recommendations,
        analyzed_at: now,
        narrative: None,
    }
}

/// Ranks stored profiles by behavioral similarity to `metrics`.
pub fn find_similar_wallets(
    address: &str,
    metrics: &WalletMetrics,
    profiles: &[StoredProfile],
    config: &SimilarityConfig,
) -> Result<Vec<SimilarityEdge>> {
    let query = SimilarityVector::from_metrics(metrics, config);
    let population: Vec<SimilarityCandidate> = profiles
        .iter()
        .map(|p| SimilarityCandidate {
            address: p.address.clone(),
            vector: SimilarityVector::from_metrics(&p.metrics, config),
        })
        .collect();
    find_similar(address, &query, &population, config)
}

/// Resolves edge targets against stored profiles and compares the wallet
/// with that cohort. Edges whose target has no stored profile are dropped.
pub fn compare_with_peers(
    metrics: &WalletMetrics,
    risk_score: RiskScore,
    edges: &[SimilarityEdge],
    profiles: &[StoredProfile],
) -> Result<ComparisonOutcome> {
    let cohort: Vec<CohortMember> = edges
        .iter()
        .filter_map(|edge| {
            let profile = profiles
                .iter()
                .find(|p| p.address.eq_ignore_ascii_case(&edge.target_address));
            if profile.is_none() {
                tracing::debug!(target = %edge.target_address, "similar wallet has no stored profile");
            }
            profile.map(|p| CohortMember {
                address: p.address.clone(),
                similarity: edge.score,
                risk_score: Some(f64::from(p.risk_score.value())),
                portfolio_value: Some(p.portfolio_value),
                metrics: Some(p.metrics.clone()),
            })
        })
        .collect();

    compare_with_cohort(metrics, risk_score, &cohort)
}
