//! Public profile text derived from a wallet's transaction history: a
//! tagline, a dated timeline of milestones, achievement badges and summary
//! stats. Everything here is a pure function of the history and `now`.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use common::types::TransactionRecord;
use serde::{Deserialize, Serialize};

const DAYS_PER_MONTH: i64 = 30;
const RECENT_WINDOW_DAYS: i64 = 30;
const WHALE_FEE_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BioConfig {
    /// First-transaction year at or before which a wallet counts as an early adopter.
    pub early_adopter_max_year: i32,
}

impl BioConfig {
    pub fn from_config(c: &common::config::Profile) -> Self {
        Self {
            early_adopter_max_year: c.early_adopter_max_year,
        }
    }
}

impl Default for BioConfig {
    fn default() -> Self {
        Self::from_config(&common::config::Profile::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: DateTime<Utc>,
    pub label: String,
    pub description: String,
    pub icon: String,
}

impl TimelineEvent {
    fn new(date: DateTime<Utc>, label: &str, description: String, icon: &str) -> Self {
        Self {
            date,
            label: label.to_string(),
            description,
            icon: icon.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeId {
    DiamondHands,
    EarlyAdopter,
    ActiveTrader,
    HotStreak,
    Whale,
    Consistent,
    PowerUser,
    Degen,
    Veteran,
    MultiChain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
}

impl Badge {
    fn new(id: BadgeId, name: &str, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_transactions: usize,
    pub portfolio_age_months: i64,
    pub first_tx_date: Option<DateTime<Utc>>,
    pub last_tx_date: Option<DateTime<Utc>>,
    pub avg_tx_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBio {
    pub tagline: String,
    pub timeline: Vec<TimelineEvent>,
    pub badges: Vec<Badge>,
    pub stats: ProfileStats,
}

/// Oldest record in a newest-first history.
fn first_tx(history: &[TransactionRecord]) -> Option<DateTime<Utc>> {
    history.last().and_then(|t| t.timestamp)
}

fn distinct_chains(history: &[TransactionRecord]) -> usize {
    history
        .iter()
        .filter_map(|t| t.chain.as_deref())
        .filter(|c| !c.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

fn recent_tx_count(history: &[TransactionRecord], now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    history
        .iter()
        .filter(|t| t.timestamp.is_some_and(|ts| ts > cutoff))
        .count()
}

fn jan_first(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

pub fn compute_stats(history: &[TransactionRecord], now: DateTime<Utc>) -> ProfileStats {
    if history.is_empty() {
        return ProfileStats::default();
    }

    let first = first_tx(history);
    let age = first
        .map(|f| ((now - f).num_days() / DAYS_PER_MONTH).max(0))
        .unwrap_or(0);
    let avg = if age > 0 {
        (history.len() as f64 / age as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    ProfileStats {
        total_transactions: history.len(),
        portfolio_age_months: age,
        first_tx_date: first,
        last_tx_date: history.first().and_then(|t| t.timestamp),
        avg_tx_per_month: avg,
    }
}

/// Transaction-count milestones, dated at the Nth transaction ever.
const COUNT_MILESTONES: [(usize, &str, &str, &str); 3] = [
    (50, "Active trader", "Reached 50 transactions", "⚡"),
    (100, "Power trader milestone", "Surpassed 100 on-chain transactions", "💯"),
    (200, "Elite trader", "200+ transactions achieved", "🌟"),
];

fn in_year(history: &[TransactionRecord], year: i32) -> Vec<DateTime<Utc>> {
    history
        .iter()
        .filter_map(|t| t.timestamp)
        .filter(|ts| ts.year() == year)
        .collect()
}

/// Timestamp of the record where the third distinct chain first appears,
/// scanning oldest to newest.
fn third_chain_date(history: &[TransactionRecord]) -> Option<DateTime<Utc>> {
    let mut seen = HashSet::new();
    for tx in history.iter().rev() {
        let Some(chain) = tx.chain.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        seen.insert(chain);
        if seen.len() >= 3 {
            return tx.timestamp;
        }
    }
    None
}

pub fn extract_timeline(
    history: &[TransactionRecord],
    now: DateTime<Utc>,
    config: &BioConfig,
) -> Vec<TimelineEvent> {
    let mut timeline = Vec::new();
    let len = history.len();

    if let Some(first) = first_tx(history) {
        timeline.push(TimelineEvent::new(
            first,
            "Started on-chain journey",
            format!("First transaction in {}", first.format("%B %Y")),
            "🚀",
        ));
        if first.year() <= config.early_adopter_max_year {
            if let Some(date) = jan_first(first.year()) {
                timeline.push(TimelineEvent::new(
                    date,
                    "Early crypto pioneer",
                    format!("Active in the pre-{} era", config.early_adopter_max_year + 1),
                    "🏆",
                ));
            }
        }
    }

    for (n, label, description, icon) in COUNT_MILESTONES {
        if len < n {
            continue;
        }
        if let Some(date) = history[len - n].timestamp {
            timeline.push(TimelineEvent::new(date, label, description.to_string(), icon));
        }
    }

    let bear = in_year(history, 2022);
    if bear.len() >= 5 {
        if let Some(date) = bear.iter().min() {
            timeline.push(TimelineEvent::new(
                *date,
                "Bear market survivor",
                "Stayed active through 2022 crypto winter".to_string(),
                "💎",
            ));
        }
    }

    if in_year(history, 2023).len() >= 10 {
        if let Some(date) = jan_first(2023) {
            timeline.push(TimelineEvent::new(
                date,
                "Bull run participant",
                "Active during 2023 recovery".to_string(),
                "🚀",
            ));
        }
    }

    let chains = distinct_chains(history);
    if chains >= 3 {
        if let Some(date) = third_chain_date(history) {
            timeline.push(TimelineEvent::new(
                date,
                "Multi-chain explorer",
                format!("Active on {chains} different chains"),
                "🌐",
            ));
        }
    }

    if let Some(anniversary) = first_tx(history).and_then(|f| f.checked_add_months(Months::new(12))) {
        if anniversary < now {
            timeline.push(TimelineEvent::new(
                anniversary,
                "1 year on-chain",
                "Celebrated first year anniversary".to_string(),
                "🎂",
            ));
        }
    }

    // Stable: same-day events keep insertion order.
    timeline.sort_by_key(|e| e.date);
    timeline
}

pub fn assign_badges(
    history: &[TransactionRecord],
    stats: &ProfileStats,
    now: DateTime<Utc>,
    config: &BioConfig,
) -> Vec<Badge> {
    let mut badges = Vec::new();
    let tx_count = history.len();
    let age = stats.portfolio_age_months;
    let recent = recent_tx_count(history, now);

    if age >= 12 {
        let years = age / 12;
        let plural = if years > 1 { "s" } else { "" };
        badges.push(Badge::new(
            BadgeId::DiamondHands,
            "💎 Diamond Hands",
            format!("Active for {years} year{plural}"),
        ));
    }

    if let Some(first) = first_tx(history).filter(|f| f.year() <= config.early_adopter_max_year) {
        badges.push(Badge::new(
            BadgeId::EarlyAdopter,
            "🚀 Early Adopter",
            format!("On-chain since {}", first.year()),
        ));
    }

    if tx_count >= 50 {
        badges.push(Badge::new(
            BadgeId::ActiveTrader,
            "⚡ Active Trader",
            format!("{tx_count}+ transactions"),
        ));
    }

    if recent >= 20 {
        badges.push(Badge::new(
            BadgeId::HotStreak,
            "🔥 Hot Streak",
            format!("{recent} transactions this month"),
        ));
    }

    // Large gas spend is the only value signal in the history.
    let large_fees = history
        .iter()
        .any(|t| t.fee_value.is_some_and(|fee| fee > WHALE_FEE_THRESHOLD));
    if large_fees && tx_count > 100 {
        badges.push(Badge::new(BadgeId::Whale, "🐋 Whale", "High-value transactions"));
    }

    if age >= 6 && tx_count as f64 / age as f64 >= 1.0 {
        badges.push(Badge::new(
            BadgeId::Consistent,
            "🎯 Consistent",
            "Regular on-chain activity",
        ));
    }

    if tx_count >= 200 {
        badges.push(Badge::new(
            BadgeId::PowerUser,
            "🌟 Power User",
            format!("{tx_count}+ transactions"),
        ));
    }

    if tx_count > 100 && age < 6 {
        badges.push(Badge::new(BadgeId::Degen, "🧪 Degen", "High-frequency experimenter"));
    }

    if age >= 36 {
        badges.push(Badge::new(BadgeId::Veteran, "🏆 Veteran", "Crypto OG - 3+ years"));
    }

    let chains = distinct_chains(history);
    if chains >= 4 {
        badges.push(Badge::new(
            BadgeId::MultiChain,
            "🌐 Multi-chain",
            format!("Active on {chains}+ chains"),
        ));
    }

    badges
}

/// First match wins.
pub fn generate_tagline(stats: &ProfileStats, badges: &[Badge], recent_tx_count: usize) -> &'static str {
    let has = |id: BadgeId| badges.iter().any(|b| b.id == id);
    let tx_count = stats.total_transactions;
    let age = stats.portfolio_age_months;
    let whale = has(BadgeId::Whale);
    let active = has(BadgeId::ActiveTrader);

    if recent_tx_count > 20 {
        return if whale {
            "Active whale making waves"
        } else {
            "High-frequency on-chain trader"
        };
    }
    if has(BadgeId::DiamondHands) && age >= 24 {
        return if whale {
            "OG crypto whale"
        } else {
            "Crypto veteran since the early days"
        };
    }
    if has(BadgeId::EarlyAdopter) {
        return if active {
            "OG trader, still building"
        } else {
            "Early adopter, diamond hands"
        };
    }
    if whale {
        return "Whale moving markets";
    }
    if has(BadgeId::Degen) {
        return "Degen trader chasing alpha";
    }
    if active {
        return if age < 6 {
            "Rising star in crypto"
        } else {
            "Seasoned on-chain trader"
        };
    }
    if age >= 12 {
        return if tx_count > 50 {
            "Experienced DeFi navigator"
        } else {
            "Long-term crypto holder"
        };
    }
    if age >= 6 {
        return "Crypto enthusiast building on-chain";
    }
    if tx_count > 30 {
        return "New trader making moves";
    }
    if tx_count > 10 {
        "On-chain explorer"
    } else {
        "Crypto newcomer"
    }
}

/// `history` is newest-first. Never fails: an empty history yields the
/// newcomer profile.
pub fn generate_bio(history: &[TransactionRecord], now: DateTime<Utc>, config: &BioConfig) -> ProfileBio {
    let stats = compute_stats(history, now);
    let timeline = extract_timeline(history, now, config);
    let badges = assign_badges(history, &stats, now, config);
    let tagline = generate_tagline(&stats, &badges, recent_tx_count(history, now));

    let undated = history.iter().filter(|t| t.timestamp.is_none()).count();
    if undated > 0 {
        tracing::warn!(undated, "transactions without a timestamp skipped for dating");
    }
    tracing::debug!(
        tx_count = stats.total_transactions,
        age_months = stats.portfolio_age_months,
        badges = badges.len(),
        milestones = timeline.len(),
        tagline,
        "bio generated"
    );

    ProfileBio {
        tagline: tagline.to_string(),
        timeline,
        badges,
        stats,
    }
}
