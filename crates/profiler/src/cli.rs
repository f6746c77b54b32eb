use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::types::WalletInput;
use serde::Serialize;

use crate::analysis::{analyze_wallet, compare_with_peers, find_similar_wallets, AnalysisContext, StoredProfile};
use crate::comparison::ComparisonOutcome;
use crate::profile_bio::generate_bio;
use crate::similarity::SimilarityEdge;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze { wallet: PathBuf },
    Bio { wallet: PathBuf },
    Similar { address: String, profiles: PathBuf },
    Compare { address: String, profiles: PathBuf },
}

const USAGE: &str = "usage: profiler <analyze|bio> <wallet.json> | profiler <similar|compare> <address> <profiles.json>";

pub fn parse_args<I>(mut args: I) -> std::result::Result<Command, String>
where
    I: Iterator<Item = String>,
{
    // Drop argv[0].
    let _ = args.next();

    let Some(cmd) = args.next() else {
        return Err(USAGE.to_string());
    };

    let mut next = |what: &str| {
        args.next()
            .ok_or_else(|| format!("usage: profiler {cmd} <{what}>"))
    };

    match cmd.as_str() {
        "analyze" => Ok(Command::Analyze {
            wallet: next("wallet.json")?.into(),
        }),
        "bio" => Ok(Command::Bio {
            wallet: next("wallet.json")?.into(),
        }),
        "similar" => Ok(Command::Similar {
            address: next("address")?,
            profiles: next("profiles.json")?.into(),
        }),
        "compare" => Ok(Command::Compare {
            address: next("address")?,
            profiles: next("profiles.json")?.into(),
        }),
        other => Err(format!("unknown command: {other}\n{USAGE}")),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerReport {
    pub similar: Vec<SimilarityEdge>,
    pub comparison: ComparisonOutcome,
}

fn find_profile<'a>(profiles: &'a [StoredProfile], address: &str) -> Result<&'a StoredProfile> {
    profiles
        .iter()
        .find(|p| p.address.eq_ignore_ascii_case(address))
        .with_context(|| format!("no stored profile for {address}"))
}

/// Runs a command and returns its JSON output.
pub fn run_command(ctx: &AnalysisContext, cmd: Command, now: DateTime<Utc>) -> Result<String> {
    let output = match cmd {
        Command::Analyze { wallet } => {
            let input: WalletInput = read_json(&wallet)?;
            let analysis = analyze_wallet(&input.snapshot, &input.transactions, &ctx.lookup, now);
            serde_json::to_string_pretty(&analysis)?
        }
        Command::Bio { wallet } => {
            let input: WalletInput = read_json(&wallet)?;
            serde_json::to_string_pretty(&generate_bio(&input.transactions, now, &ctx.bio))?
        }
        Command::Similar { address, profiles } => {
            let profiles: Vec<StoredProfile> = read_json(&profiles)?;
            let me = find_profile(&profiles, &address)?;
            let edges = find_similar_wallets(&me.address, &me.metrics, &profiles, &ctx.similarity)?;
            serde_json::to_string_pretty(&edges)?
        }
        Command::Compare { address, profiles } => {
            let profiles: Vec<StoredProfile> = read_json(&profiles)?;
            let me = find_profile(&profiles, &address)?;
            let similar = find_similar_wallets(&me.address, &me.metrics, &profiles, &ctx.similarity)?;
            let comparison = compare_with_peers(&me.metrics, me.risk_score, &similar, &profiles)?;
            serde_json::to_string_pretty(&PeerReport {
                similar,
                comparison,
            })?
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        std::iter::once("profiler".to_string())
            .chain(list.iter().map(|s| (*s).to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_parse_args_requires_a_command() {
        assert!(parse_args(args(&[])).is_err());
    }

    #[test]
    fn test_parse_analyze_command() {
        let cmd = parse_args(args(&["analyze", "wallet.json"])).unwrap();
        assert_eq!(
            cmd,
            Command::Analyze {
                wallet: PathBuf::from("wallet.json")
            }
        );
    }

    #[test]
    fn test_parse_compare_command() {
        let cmd = parse_args(args(&["compare", "0xabc", "profiles.json"])).unwrap();
        assert_eq!(
            cmd,
            Command::Compare {
                address: "0xabc".to_string(),
                profiles: PathBuf::from("profiles.json")
            }
        );
    }

    #[test]
    fn test_parse_missing_argument() {
        let err = parse_args(args(&["similar", "0xabc"])).unwrap_err();
        assert!(err.contains("profiles.json"));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_args(args(&["score"])).unwrap_err();
        assert!(err.starts_with("unknown command: score"));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let cmd = Command::Analyze {
            wallet: PathBuf::from("/nonexistent/wallet.json"),
        };
        let err = run_command(&AnalysisContext::default(), cmd, Utc::now()).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/wallet.json"));
    }
}
