pub mod analysis;
pub mod cli;
pub mod comparison;
pub mod error;
pub mod metrics;
pub mod personality_classification;
pub mod profile_bio;
pub mod risk_scoring;
pub mod similarity;
pub mod wallet_insights;
pub mod wallet_metrics;

pub use analysis::{
    analyze_wallet, compare_with_peers, find_similar_wallets, AnalysisContext, StoredProfile,
    WalletAnalysis,
};
pub use comparison::{compare_with_cohort, CohortMember, ComparisonOutcome, ComparisonResult};
pub use error::{AnalysisError, Result};
pub use personality_classification::{classify_personality, Personality};
pub use profile_bio::{generate_bio, BioConfig, ProfileBio};
pub use risk_scoring::{compute_risk_score, RiskScore};
pub use similarity::{
    cosine_similarity, find_similar, watchers_of, SimilarityCandidate, SimilarityConfig,
    SimilarityEdge, SimilarityVector,
};
pub use wallet_insights::{generate_insights, InsightSet};
pub use wallet_metrics::{compute_wallet_metrics, AssetLookup, WalletMetrics};
