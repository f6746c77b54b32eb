use serde::{Deserialize, Serialize};

use crate::wallet_metrics::WalletMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    #[serde(rename = "Conservative DeFi Native")]
    ConservativeDefiNative,
    #[serde(rename = "Degen Trader")]
    DegenTrader,
    #[serde(rename = "Blue-chip Hodler")]
    BluechipHodler,
    #[serde(rename = "Multi-chain Explorer")]
    MultichainExplorer,
    #[serde(rename = "Yield Farmer")]
    YieldFarmer,
    #[serde(rename = "Stablecoin Parker")]
    StablecoinParker,
    /// Reserved; no rule currently produces it.
    #[serde(rename = "NFT Collector")]
    NftCollector,
    #[serde(rename = "Balanced Trader")]
    BalancedTrader,
}

impl Personality {
    pub const ALL: [Self; 8] = [
        Self::ConservativeDefiNative,
        Self::DegenTrader,
        Self::BluechipHodler,
        Self::MultichainExplorer,
        Self::YieldFarmer,
        Self::StablecoinParker,
        Self::NftCollector,
        Self::BalancedTrader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConservativeDefiNative => "Conservative DeFi Native",
            Self::DegenTrader => "Degen Trader",
            Self::BluechipHodler => "Blue-chip Hodler",
            Self::MultichainExplorer => "Multi-chain Explorer",
            Self::YieldFarmer => "Yield Farmer",
            Self::StablecoinParker => "Stablecoin Parker",
            Self::NftCollector => "NFT Collector",
            Self::BalancedTrader => "Balanced Trader",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == label)
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the decision list: the first rule whose predicate holds wins.
pub struct PersonalityRule {
    pub personality: Personality,
    pub matches: fn(&WalletMetrics) -> bool,
}

fn is_stablecoin_parker(m: &WalletMetrics) -> bool {
    m.allocations.stablecoins > 0.6
}

fn is_bluechip_hodler(m: &WalletMetrics) -> bool {
    m.allocations.bluechip > 0.7 && m.avg_tx_per_month < 5.0
}

fn is_degen_trader(m: &WalletMetrics) -> bool {
    m.avg_tx_per_month > 20.0 && m.allocations.bluechip < 0.3
}

fn is_multichain_explorer(m: &WalletMetrics) -> bool {
    m.chain_count >= 4
}

fn is_yield_farmer(m: &WalletMetrics) -> bool {
    m.protocol_count >= 5 && m.allocations.defi > 0.2
}

fn is_conservative_defi_native(m: &WalletMetrics) -> bool {
    m.allocations.bluechip > 0.4 && m.protocol_count >= 3
}

/// Priority order matters: a wallet parked in stablecoins across many chains
/// is a Stablecoin Parker, not a Multi-chain Explorer.
pub const PERSONALITY_RULES: &[PersonalityRule] = &[
    PersonalityRule {
        personality: Personality::StablecoinParker,
        matches: is_stablecoin_parker,
    },
    PersonalityRule {
        personality: Personality::BluechipHodler,
        matches: is_bluechip_hodler,
    },
    PersonalityRule {
        personality: Personality::DegenTrader,
        matches: is_degen_trader,
    },
    PersonalityRule {
        personality: Personality::MultichainExplorer,
        matches: is_multichain_explorer,
    },
    PersonalityRule {
        personality: Personality::YieldFarmer,
        matches: is_yield_farmer,
    },
    PersonalityRule {
        personality: Personality::ConservativeDefiNative,
        matches: is_conservative_defi_native,
    },
];

pub fn classify_personality(metrics: &WalletMetrics) -> Personality {
    PERSONALITY_RULES
        .iter()
        .find(|rule| (rule.matches)(metrics))
        .map_or(Personality::BalancedTrader, |rule| rule.personality)
}
