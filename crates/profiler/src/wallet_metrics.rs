use std::collections::HashSet;

use common::types::{PortfolioSnapshot, Position, TransactionRecord};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MONTH: f64 = 30.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Fraction of portfolio value per bucket. All zero for an empty portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allocations {
    pub stablecoins: f64,
    pub bluechip: f64,
    pub defi: f64,
    pub other: f64,
}

impl Allocations {
    /// True when no bucket holds any value.
    pub fn is_empty(&self) -> bool {
        !(self.stablecoins > 0.0 || self.bluechip > 0.0 || self.defi > 0.0 || self.other > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Stablecoin,
    Bluechip,
    Defi,
    Other,
}

/// Immutable symbol lookup sets. Symbols are stored upper-cased.
#[derive(Debug, Clone)]
pub struct AssetLookup {
    stablecoins: HashSet<String>,
    bluechips: HashSet<String>,
    defi: HashSet<String>,
}

fn upper_set(symbols: &[String]) -> HashSet<String> {
    symbols.iter().map(|s| s.trim().to_uppercase()).collect()
}

impl AssetLookup {
    pub fn from_config(c: &common::config::AssetCategories) -> Self {
        Self {
            stablecoins: upper_set(&c.stablecoins),
            bluechips: upper_set(&c.bluechips),
            defi: upper_set(&c.defi),
        }
    }

    /// Stablecoin membership is checked first, then bluechip, then defi.
    pub fn categorize(&self, symbol: &str) -> AssetCategory {
        let symbol = symbol.trim().to_uppercase();
        if self.stablecoins.contains(&symbol) {
            AssetCategory::Stablecoin
        } else if self.bluechips.contains(&symbol) {
            AssetCategory::Bluechip
        } else if self.defi.contains(&symbol) {
            AssetCategory::Defi
        } else {
            AssetCategory::Other
        }
    }
}

impl Default for AssetLookup {
    fn default() -> Self {
        Self::from_config(&common::config::AssetCategories::default())
    }
}

/// Fixed-shape feature record derived from a snapshot and its history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletMetrics {
    pub total_value: f64,
    pub allocations: Allocations,
    pub chain_count: u32,
    pub chains: Vec<String>,
    pub protocol_count: u32,
    pub protocols: Vec<String>,
    pub tx_count: u32,
    pub avg_tx_per_month: f64,
    /// Herfindahl index over position shares.
    pub concentration: f64,
    pub position_count: u32,
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn position_value(position: &Position) -> f64 {
    position
        .value
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
        .max(0.0)
}

/// Distinct entries in first-seen order.
fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// Denominator for position shares, or None when the portfolio is empty.
/// Uses the larger of the reported total and the summed positions so every
/// share stays within [0, 1] even when the provider total is stale.
fn share_denominator(total_value: f64, positions: &[Position]) -> Option<f64> {
    if total_value <= 0.0 {
        return None;
    }
    let positions_sum: f64 = positions.iter().map(position_value).sum();
    Some(total_value.max(positions_sum))
}

pub fn compute_allocations(
    positions: &[Position],
    total_value: f64,
    lookup: &AssetLookup,
) -> Allocations {
    let Some(denominator) = share_denominator(total_value, positions) else {
        return Allocations::default();
    };

    let mut allocations = Allocations::default();
    for position in positions {
        let share = position_value(position) / denominator;
        match lookup.categorize(&position.symbol) {
            AssetCategory::Stablecoin => allocations.stablecoins += share,
            AssetCategory::Bluechip => allocations.bluechip += share,
            AssetCategory::Defi => allocations.defi += share,
            AssetCategory::Other => allocations.other += share,
        }
    }
    allocations
}

/// Herfindahl index: 0 = perfectly diversified, 1 = a single holding.
pub fn compute_concentration(positions: &[Position], total_value: f64) -> f64 {
    let Some(denominator) = share_denominator(total_value, positions) else {
        return 0.0;
    };
    positions
        .iter()
        .map(|p| {
            let share = position_value(p) / denominator;
            share * share
        })
        .sum()
}

/// Transactions per 30-day month between the oldest and newest record.
/// `history` is newest-first.
pub fn compute_tx_per_month(history: &[TransactionRecord]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let newest = history.first().and_then(|t| t.timestamp);
    let oldest = history.last().and_then(|t| t.timestamp);
    let (Some(newest), Some(oldest)) = (newest, oldest) else {
        tracing::debug!(
            tx_count = history.len(),
            "history endpoints lack timestamps, frequency is 0"
        );
        return 0.0;
    };

    let months = (newest - oldest).num_milliseconds() as f64 / MILLIS_PER_MONTH;
    if months > 0.0 {
        history.len() as f64 / months
    } else {
        0.0
    }
}

/// Never fails: missing or zero inputs degrade to zero-valued metrics.
pub fn compute_wallet_metrics(
    snapshot: &PortfolioSnapshot,
    history: &[TransactionRecord],
    lookup: &AssetLookup,
) -> WalletMetrics {
    let total_value = if snapshot.total_value.is_finite() {
        snapshot.total_value.max(0.0)
    } else {
        tracing::warn!(
            address = %snapshot.address,
            "non-finite portfolio total, treating as empty"
        );
        0.0
    };

    let chains = distinct(snapshot.chains.iter().map(String::as_str));
    let protocols = distinct(
        snapshot
            .positions
            .iter()
            .filter_map(|p| p.protocol.as_deref()),
    );

    WalletMetrics {
        total_value,
        allocations: compute_allocations(&snapshot.positions, total_value, lookup),
        chain_count: count(chains.len()),
        chains,
        protocol_count: count(protocols.len()),
        protocols,
        tx_count: count(history.len()),
        avg_tx_per_month: compute_tx_per_month(history),
        concentration: compute_concentration(&snapshot.positions, total_value),
        position_count: count(snapshot.positions.len()),
    }
}
