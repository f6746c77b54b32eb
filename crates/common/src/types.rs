use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Holdings of one wallet as reported by the wallet-data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub address: String,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub chains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// One entry of a wallet's transaction history. Histories are newest-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub chain: Option<String>,
    pub fee_value: Option<f64>,
}

/// Transaction as returned by the provider's `/transactions` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTransaction {
    #[serde(default)]
    pub attributes: ApiTransactionAttributes,
    #[serde(default)]
    pub relationships: ApiRelationships,
    /// Some payloads carry the timestamp at the top level.
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTransactionAttributes {
    pub hash: Option<String>,
    pub mined_at: Option<String>,
    pub timestamp: Option<String>,
    pub sent_at: Option<String>,
    pub received_at: Option<String>,
    pub fee: Option<ApiFee>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFee {
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRelationships {
    pub chain: Option<ApiRelationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRelationship {
    pub data: Option<ApiRelationshipData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRelationshipData {
    pub id: Option<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(raw, error = %e, "unparseable transaction timestamp");
            None
        }
    }
}

impl From<ApiTransaction> for TransactionRecord {
    fn from(tx: ApiTransaction) -> Self {
        let attrs = tx.attributes;
        let timestamp = attrs
            .mined_at
            .as_deref()
            .or(attrs.timestamp.as_deref())
            .or(attrs.sent_at.as_deref())
            .or(attrs.received_at.as_deref())
            .or(tx.timestamp.as_deref())
            .and_then(parse_timestamp);
        let chain = tx
            .relationships
            .chain
            .and_then(|c| c.data)
            .and_then(|d| d.id);

        Self {
            hash: attrs.hash,
            timestamp,
            chain,
            fee_value: attrs.fee.and_then(|f| f.value),
        }
    }
}

/// Snapshot plus history for a single wallet, as handed to the analysis core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInput {
    pub snapshot: PortfolioSnapshot,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}
