use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub observability: Observability,
    #[serde(default)]
    pub asset_categories: AssetCategories,
    #[serde(default)]
    pub similarity: Similarity,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Observability {
    pub prometheus_enabled: bool,
    pub prometheus_port: u16,
}

impl Default for Observability {
    fn default() -> Self {
        Self {
            prometheus_enabled: false,
            prometheus_port: 9095,
        }
    }
}

/// Symbol lists used to bucket positions. Matching is case-insensitive.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetCategories {
    pub stablecoins: Vec<String>,
    pub bluechips: Vec<String>,
    pub defi: Vec<String>,
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for AssetCategories {
    fn default() -> Self {
        Self {
            stablecoins: symbols(&["USDC", "USDT", "DAI", "BUSD", "FRAX"]),
            bluechips: symbols(&["ETH", "WETH", "BTC", "WBTC", "BNB", "SOL", "MATIC", "AVAX"]),
            defi: symbols(&["AAVE", "UNI", "COMP", "CRV", "SNX", "MKR", "LDO", "RPL"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Similarity {
    pub min_score: f64,
    pub top_k: usize,
    pub chain_scale: f64,
    pub protocol_scale: f64,
}

impl Default for Similarity {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            top_k: 20,
            chain_scale: 10.0,
            protocol_scale: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub early_adopter_max_year: i32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            early_adopter_max_year: 2020,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = Config::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert!(config.asset_categories.stablecoins.contains(&"USDC".to_string()));
        assert_eq!(config.similarity.top_k, 20);
        assert!((config.similarity.min_score - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let toml = r#"
[general]
log_level = "debug"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(!config.observability.prometheus_enabled);
        assert_eq!(config.asset_categories.bluechips.len(), 8);
        assert_eq!(config.asset_categories.defi.len(), 8);
        assert!((config.similarity.chain_scale - 10.0).abs() < f64::EPSILON);
        assert!((config.similarity.protocol_scale - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.profile.early_adopter_max_year, 2020);
    }

    #[test]
    fn test_custom_asset_categories() {
        let toml = r#"
[general]
log_level = "info"

[asset_categories]
stablecoins = ["USDC", "PYUSD"]
bluechips = ["ETH"]
defi = []
"#;
        let config: Config = toml.parse().unwrap();
        assert_eq!(config.asset_categories.stablecoins, vec!["USDC", "PYUSD"]);
        assert!(config.asset_categories.defi.is_empty());
    }

    #[test]
    fn test_missing_general_section_is_rejected() {
        assert!(Config::from_toml_str("[similarity]\nmin_score = 0.5\ntop_k = 5\nchain_scale = 10.0\nprotocol_scale = 15.0\n").is_err());
    }
}
