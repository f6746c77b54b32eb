use std::io::Write;

use chrono::{TimeZone, Utc};
use profiler::cli::{run_command, Command};
use profiler::{
    analyze_wallet, compare_with_peers, find_similar_wallets, watchers_of, AnalysisContext,
    ComparisonOutcome, Personality, StoredProfile,
};

const WALLET_JSON: &str = r#"{
  "snapshot": {
    "address": "0xAbC0000000000000000000000000000000000001",
    "totalValue": 10000,
    "positions": [
      {"symbol": "eth", "value": 6000, "chain": "ethereum"},
      {"symbol": "USDC", "value": 2000, "chain": "base"},
      {"symbol": "AAVE", "value": 1000, "chain": "ethereum", "protocol": "Aave"},
      {"symbol": "PEPE", "value": 1000, "chain": "ethereum"}
    ],
    "chains": ["ethereum", "base", "arbitrum"]
  },
  "transactions": [
    {"timestamp": "2025-05-20T00:00:00Z", "chain": "base"},
    {"timestamp": "2025-03-01T00:00:00Z", "chain": "arbitrum"},
    {"timestamp": "2024-11-01T00:00:00Z", "chain": "ethereum"}
  ]
}"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_analyze_command_outputs_full_analysis() {
    let wallet = write_temp(WALLET_JSON);
    let out = run_command(
        &AnalysisContext::default(),
        Command::Analyze {
            wallet: wallet.path().to_path_buf(),
        },
        now(),
    )
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["address"], "0xAbC0000000000000000000000000000000000001");
    assert_eq!(json["metrics"]["chainCount"], 3);
    assert_eq!(json["metrics"]["protocolCount"], 1);
    assert_eq!(json["metrics"]["txCount"], 3);
    assert!((json["metrics"]["allocations"]["bluechip"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    assert!(json["riskScore"].as_u64().unwrap() >= 1);
    assert!(json.get("narrative").is_none());
    assert!(!json["strengths"].as_array().unwrap().is_empty());
}

#[test]
fn test_bio_command_outputs_tagline() {
    let wallet = write_temp(WALLET_JSON);
    let out = run_command(
        &AnalysisContext::default(),
        Command::Bio {
            wallet: wallet.path().to_path_buf(),
        },
        now(),
    )
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    // Oldest transaction is seven months old.
    assert_eq!(json["tagline"], "Crypto enthusiast building on-chain");
    assert_eq!(json["stats"]["portfolioAgeMonths"], 7);
    assert_eq!(json["stats"]["totalTransactions"], 3);
    assert_eq!(json["timeline"][0]["label"], "Started on-chain journey");
}

#[test]
fn test_profiles_round_trip_through_similar_and_compare() {
    let ctx = AnalysisContext::default();
    let input: common::types::WalletInput = serde_json::from_str(WALLET_JSON).unwrap();
    let me = analyze_wallet(&input.snapshot, &input.transactions, &ctx.lookup, now());

    let mut twin_snapshot = input.snapshot.clone();
    twin_snapshot.address = "0xtwin".to_string();
    twin_snapshot.total_value = 5000.0;
    for p in &mut twin_snapshot.positions {
        p.value = p.value.map(|v| v / 2.0);
    }
    let twin = analyze_wallet(&twin_snapshot, &[], &ctx.lookup, now());

    let profiles: Vec<StoredProfile> = vec![me.to_profile(), twin.to_profile()];
    let profiles_file = write_temp(&serde_json::to_string(&profiles).unwrap());

    let out = run_command(
        &ctx,
        Command::Similar {
            address: "0xabc0000000000000000000000000000000000001".to_string(),
            profiles: profiles_file.path().to_path_buf(),
        },
        now(),
    )
    .unwrap();
    let edges: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(edges.as_array().unwrap().len(), 1);
    assert_eq!(edges[0]["targetAddress"], "0xtwin");

    let out = run_command(
        &ctx,
        Command::Compare {
            address: me.address.clone(),
            profiles: profiles_file.path().to_path_buf(),
        },
        now(),
    )
    .unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["comparison"]["outcome"], "compared");
    assert_eq!(report["comparison"]["portfolioValue"]["position"], "significantly_above");
    assert_eq!(report["comparison"]["portfolioValue"]["diffPercent"], 100);
}

#[test]
fn test_library_pipeline_and_watchers() {
    let ctx = AnalysisContext::default();
    let input: common::types::WalletInput = serde_json::from_str(WALLET_JSON).unwrap();
    let me = analyze_wallet(&input.snapshot, &input.transactions, &ctx.lookup, now());
    assert_ne!(me.personality, Personality::NftCollector);

    let edges = find_similar_wallets(&me.address, &me.metrics, &[me.to_profile()], &ctx.similarity).unwrap();
    assert!(edges.is_empty());
    let outcome = compare_with_peers(&me.metrics, me.risk_score, &edges, &[]).unwrap();
    assert!(matches!(outcome, ComparisonOutcome::NoPeers { .. }));

    let peer_edges = find_similar_wallets("0xpeer", &me.metrics, &[me.to_profile()], &ctx.similarity).unwrap();
    assert_eq!(watchers_of(&peer_edges, &me.address), vec!["0xpeer"]);
}
