use serde::{Deserialize, Serialize};

use crate::wallet_metrics::WalletMetrics;

pub const MIN_RISK: u8 = 1;
pub const MAX_RISK: u8 = 10;
const NEUTRAL_RISK: f64 = 5.0;

/// 1 = most conservative, 10 = most aggressive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const NEUTRAL: Self = Self(5);

    /// Clamps into [1, 10] and rounds half-up.
    pub fn from_raw(raw: f64) -> Self {
        let clamped = raw.clamp(f64::from(MIN_RISK), f64::from(MAX_RISK));
        // Values are positive here, so `round` (half away from zero) is half-up.
        Self(clamped.round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// Holdings exist but none carry value, so allocation rules have nothing
/// to look at. Only structure-based adjustments apply.
fn fallback_adjustments(m: &WalletMetrics) -> f64 {
    let mut delta = 0.0;
    if m.chain_count >= 3 {
        delta -= 1.0;
    }
    if m.chain_count >= 5 {
        delta += 1.0;
    }
    if m.position_count < 3 {
        delta += 1.0;
    }
    if m.position_count > 10 {
        delta += 1.0;
    }
    delta
}

fn allocation_adjustments(m: &WalletMetrics) -> f64 {
    let a = &m.allocations;
    let mut delta = 0.0;

    if a.stablecoins > 0.5 {
        delta -= 2.0;
    } else if a.stablecoins < 0.1 {
        delta += 1.0;
    }

    if a.bluechip > 0.6 {
        delta -= 2.0;
    } else if a.bluechip < 0.2 {
        delta += 2.0;
    }

    if a.other > 0.5 {
        delta += 2.0;
    }

    if m.concentration > 0.7 {
        delta += 2.0;
    } else if m.concentration < 0.3 {
        delta -= 1.0;
    }

    // Single chain is platform risk; many chains is operational risk.
    if m.chain_count > 5 || m.chain_count == 1 {
        delta += 1.0;
    }

    if m.protocol_count > 10 {
        delta += 1.0;
    } else if m.protocol_count >= 5 {
        delta += 0.5;
    }

    delta
}

pub fn compute_risk_score(metrics: &WalletMetrics) -> RiskScore {
    if metrics.total_value <= 0.0 || metrics.position_count == 0 {
        return RiskScore::NEUTRAL;
    }

    let delta = if metrics.allocations.is_empty() {
        tracing::debug!(
            position_count = metrics.position_count,
            "no valued positions, using structural risk rules"
        );
        fallback_adjustments(metrics)
    } else {
        allocation_adjustments(metrics)
    };

    RiskScore::from_raw(NEUTRAL_RISK + delta)
}
