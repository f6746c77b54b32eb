use serde::{Deserialize, Serialize};

use crate::personality_classification::Personality;
use crate::risk_scoring::RiskScore;
use crate::wallet_metrics::WalletMetrics;

pub const MAX_STRENGTHS: usize = 4;
pub const MAX_WEAKNESSES: usize = 3;
pub const MAX_RECOMMENDATIONS: usize = 3;

pub const FALLBACK_STRENGTH: &str = "Active crypto participant";
pub const FALLBACK_RECOMMENDATION: &str = "Portfolio looks balanced - maintain current strategy";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSet {
    pub strengths: Vec<String>,
    /// May be empty.
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

type InsightRule = (fn(&WalletMetrics) -> bool, &'static str);

const STRENGTH_RULES: &[InsightRule] = &[
    (
        |m: &WalletMetrics| m.allocations.bluechip > 0.5,
        "Strong blue-chip allocation provides stability",
    ),
    (
        |m: &WalletMetrics| m.chain_count >= 3,
        "Good multi-chain diversification reduces platform risk",
    ),
    (
        |m: &WalletMetrics| m.protocol_count >= 5,
        "Active DeFi engagement across multiple protocols",
    ),
    (
        |m: &WalletMetrics| m.concentration < 0.4,
        "Well-diversified portfolio reduces concentration risk",
    ),
    (
        |m: &WalletMetrics| m.allocations.stablecoins > 0.1 && m.allocations.stablecoins < 0.3,
        "Healthy stablecoin buffer for opportunities",
    ),
];

const WEAKNESS_RULES: &[InsightRule] = &[
    (
        |m: &WalletMetrics| m.allocations.stablecoins > 0.5,
        "High stablecoin allocation limits upside potential",
    ),
    (
        |m: &WalletMetrics| m.allocations.bluechip < 0.2,
        "Low exposure to established assets increases risk",
    ),
    (
        |m: &WalletMetrics| m.chain_count == 1,
        "Single-chain exposure creates platform risk",
    ),
    (
        |m: &WalletMetrics| m.concentration > 0.7,
        "High concentration in few positions",
    ),
    (
        |m: &WalletMetrics| m.protocol_count > 12,
        "Many protocols increase complexity and management burden",
    ),
];

const RECOMMENDATION_RULES: &[InsightRule] = &[
    (
        |m: &WalletMetrics| m.allocations.stablecoins > 0.4,
        "Consider reducing stablecoin allocation to 15-25% to capture more upside",
    ),
    (
        |m: &WalletMetrics| m.chain_count < 3,
        "Explore emerging L2s like Base, Arbitrum, or Optimism",
    ),
    (
        |m: &WalletMetrics| m.allocations.bluechip < 0.3,
        "Increase ETH/BTC allocation for portfolio stability",
    ),
    (
        |m: &WalletMetrics| m.concentration > 0.6,
        "Diversify holdings to reduce single-position risk",
    ),
    (
        |m: &WalletMetrics| m.allocations.defi <= 0.0 && m.protocol_count < 3,
        "Consider DeFi yield opportunities (Aave, Compound) for passive income",
    ),
];

/// First `cap` matching rules, in rule order.
fn fire(rules: &[InsightRule], metrics: &WalletMetrics, cap: usize) -> Vec<String> {
    rules
        .iter()
        .filter(|(applies, _)| applies(metrics))
        .take(cap)
        .map(|(_, text)| (*text).to_string())
        .collect()
}

pub fn generate_insights(
    metrics: &WalletMetrics,
    personality: Personality,
    risk: RiskScore,
) -> InsightSet {
    let mut strengths = fire(STRENGTH_RULES, metrics, MAX_STRENGTHS);
    let weaknesses = fire(WEAKNESS_RULES, metrics, MAX_WEAKNESSES);
    let mut recommendations = fire(RECOMMENDATION_RULES, metrics, MAX_RECOMMENDATIONS);

    if strengths.is_empty() {
        strengths.push(FALLBACK_STRENGTH.to_string());
    }
    if recommendations.is_empty() {
        recommendations.push(FALLBACK_RECOMMENDATION.to_string());
    }

    tracing::debug!(
        personality = personality.as_str(),
        risk = risk.value(),
        strengths = strengths.len(),
        weaknesses = weaknesses.len(),
        recommendations = recommendations.len(),
        "insights generated"
    );

    InsightSet {
        strengths,
        weaknesses,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet_metrics::Allocations;

    fn make_metrics(
        stablecoins: f64,
        bluechip: f64,
        defi: f64,
        chain_count: u32,
        protocol_count: u32,
        concentration: f64,
    ) -> WalletMetrics {
        WalletMetrics {
            total_value: 5000.0,
            allocations: Allocations {
                stablecoins,
                bluechip,
                defi,
                other: 0.0,
            },
            chain_count,
            protocol_count,
            concentration,
            position_count: 6,
            ..WalletMetrics::default()
        }
    }

    fn insights(m: &WalletMetrics) -> InsightSet {
        generate_insights(m, Personality::BalancedTrader, RiskScore::NEUTRAL)
    }

    #[test]
    fn test_strengths_capped_at_four_in_rule_order() {
        // All five strength rules fire.
        let m = make_metrics(0.2, 0.6, 0.2, 3, 5, 0.2);
        let out = insights(&m);
        assert_eq!(out.strengths.len(), MAX_STRENGTHS);
        assert_eq!(out.strengths[0], "Strong blue-chip allocation provides stability");
        assert_eq!(
            out.strengths[3],
            "Well-diversified portfolio reduces concentration risk"
        );
        assert!(!out
            .strengths
            .contains(&"Healthy stablecoin buffer for opportunities".to_string()));
    }

    #[test]
    fn test_fallback_strength_when_nothing_fires() {
        let m = make_metrics(0.0, 0.1, 0.0, 1, 0, 0.9);
        let out = insights(&m);
        assert_eq!(out.strengths, vec![FALLBACK_STRENGTH.to_string()]);
    }

    #[test]
    fn test_weaknesses_capped_at_three() {
        let m = make_metrics(0.6, 0.1, 0.0, 1, 13, 0.8);
        let out = insights(&m);
        assert_eq!(
            out.weaknesses,
            vec![
                "High stablecoin allocation limits upside potential".to_string(),
                "Low exposure to established assets increases risk".to_string(),
                "Single-chain exposure creates platform risk".to_string(),
            ]
        );
    }

    #[test]
    fn test_weaknesses_may_be_empty() {
        let m = make_metrics(0.2, 0.5, 0.3, 3, 4, 0.3);
        assert!(insights(&m).weaknesses.is_empty());
    }

    #[test]
    fn test_recommendations_first_three_matching() {
        let m = make_metrics(0.5, 0.1, 0.0, 1, 0, 0.9);
        let out = insights(&m);
        assert_eq!(out.recommendations.len(), MAX_RECOMMENDATIONS);
        assert!(out.recommendations[0].starts_with("Consider reducing stablecoin"));
        assert!(out.recommendations[1].starts_with("Explore emerging L2s"));
        assert!(out.recommendations[2].starts_with("Increase ETH/BTC"));
    }

    #[test]
    fn test_defi_recommendation_requires_zero_defi() {
        let m = make_metrics(0.2, 0.5, 0.0, 3, 2, 0.3);
        assert_eq!(
            insights(&m).recommendations,
            vec!["Consider DeFi yield opportunities (Aave, Compound) for passive income".to_string()]
        );
        let m = make_metrics(0.2, 0.5, 0.05, 3, 2, 0.3);
        assert_eq!(
            insights(&m).recommendations,
            vec![FALLBACK_RECOMMENDATION.to_string()]
        );
    }

    #[test]
    fn test_stablecoin_buffer_bounds_are_exclusive() {
        let at_floor = make_metrics(0.1, 0.0, 0.0, 1, 0, 0.9);
        assert_eq!(insights(&at_floor).strengths, vec![FALLBACK_STRENGTH.to_string()]);
        let inside = make_metrics(0.15, 0.0, 0.0, 1, 0, 0.9);
        assert_eq!(
            insights(&inside).strengths,
            vec!["Healthy stablecoin buffer for opportunities".to_string()]
        );
    }
}
