use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, AnalysisError, Result};
use crate::wallet_metrics::WalletMetrics;

pub const VECTOR_DIMENSIONS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityConfig {
    /// Scores must be strictly above this to count as a match.
    pub min_score: f64,
    pub top_k: usize,
    pub chain_scale: f64,
    pub protocol_scale: f64,
}

impl SimilarityConfig {
    pub fn from_config(c: &common::config::Similarity) -> Self {
        Self {
            min_score: c.min_score,
            top_k: c.top_k,
            chain_scale: c.chain_scale,
            protocol_scale: c.protocol_scale,
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self::from_config(&common::config::Similarity::default())
    }
}

/// Behavioral fingerprint of a wallet:
/// `[stablecoins, bluechip, defi, chains / chain_scale, protocols / protocol_scale, concentration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityVector(Vec<f64>);

impl SimilarityVector {
    pub fn from_metrics(metrics: &WalletMetrics, config: &SimilarityConfig) -> Self {
        let a = &metrics.allocations;
        Self(vec![
            a.stablecoins,
            a.bluechip,
            a.defi,
            f64::from(metrics.chain_count) / config.chain_scale,
            f64::from(metrics.protocol_count) / config.protocol_scale,
            metrics.concentration,
        ])
    }

    /// Wraps raw components. Used for vectors loaded from storage, which may
    /// not have the expected shape.
    pub fn from_components(components: Vec<f64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn magnitude(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// Cosine of the angle between two vectors, in [-1, 1]. Zero when either
/// vector has no magnitude.
pub fn cosine_similarity(a: &SimilarityVector, b: &SimilarityVector) -> Result<f64> {
    if a.len() != b.len() {
        return Err(AnalysisError::InvalidVector {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.0.iter().chain(b.0.iter()).any(|x| !x.is_finite()) {
        return Err(AnalysisError::NonFinite {
            field: "similarity vector",
        });
    }

    let norm_a = a.magnitude();
    let norm_b = b.magnitude();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let dot: f64 = a.0.iter().zip(&b.0).map(|(x, y)| x * y).sum();
    let score = ensure_finite("cosine similarity", dot / (norm_a * norm_b))?;
    Ok(score.clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityCandidate {
    pub address: String,
    pub vector: SimilarityVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityEdge {
    pub source_address: String,
    pub target_address: String,
    pub score: f64,
}

/// Query vector plus population in, ranked top-K edges out.
pub trait NeighborSearch {
    fn nearest(&self, source_address: &str, query: &SimilarityVector) -> Result<Vec<SimilarityEdge>>;
}

/// Linear scan over every candidate. O(population) per query.
pub struct ExhaustiveScan<'a> {
    population: &'a [SimilarityCandidate],
    config: &'a SimilarityConfig,
}

impl<'a> ExhaustiveScan<'a> {
    pub fn new(population: &'a [SimilarityCandidate], config: &'a SimilarityConfig) -> Self {
        Self { population, config }
    }
}

impl NeighborSearch for ExhaustiveScan<'_> {
    fn nearest(&self, source_address: &str, query: &SimilarityVector) -> Result<Vec<SimilarityEdge>> {
        let mut edges = Vec::new();
        let mut scanned: u64 = 0;

        for candidate in self.population {
            if candidate.address.eq_ignore_ascii_case(source_address) {
                continue;
            }
            scanned += 1;

            let score = cosine_similarity(query, &candidate.vector).inspect_err(|e| {
                tracing::error!(
                    source = source_address,
                    target = candidate.address.as_str(),
                    error = %e,
                    "rejected population vector"
                );
            })?;

            if score > self.config.min_score {
                edges.push(SimilarityEdge {
                    source_address: source_address.to_string(),
                    target_address: candidate.address.clone(),
                    score,
                });
            }
        }

        // sort_by is stable: equal scores keep population order.
        edges.sort_by(|a, b| b.score.total_cmp(&a.score));
        edges.truncate(self.config.top_k);

        metrics::counter!("profiler_similarity_candidates_total").increment(scanned);
        metrics::counter!("profiler_similarity_matches_total").increment(edges.len() as u64);
        tracing::debug!(
            source = source_address,
            scanned,
            matches = edges.len(),
            "similarity scan complete"
        );

        Ok(edges)
    }
}

pub fn find_similar(
    source_address: &str,
    query: &SimilarityVector,
    population: &[SimilarityCandidate],
    config: &SimilarityConfig,
) -> Result<Vec<SimilarityEdge>> {
    ExhaustiveScan::new(population, config).nearest(source_address, query)
}

/// Sources whose edges point at `address`, deduplicated in edge order.
pub fn watchers_of<'a>(edges: &'a [SimilarityEdge], address: &str) -> Vec<&'a str> {
    let mut watchers: Vec<&str> = Vec::new();
    for edge in edges {
        if edge.target_address.eq_ignore_ascii_case(address)
            && !watchers
                .iter()
                .any(|w| w.eq_ignore_ascii_case(&edge.source_address))
        {
            watchers.push(&edge.source_address);
        }
    }
    watchers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet_metrics::Allocations;

    fn v(components: &[f64]) -> SimilarityVector {
        SimilarityVector::from_components(components.to_vec())
    }

    fn make_candidate(address: &str, components: &[f64]) -> SimilarityCandidate {
        SimilarityCandidate {
            address: address.to_string(),
            vector: v(components),
        }
    }

    #[test]
    fn test_vector_derivation() {
        let m = WalletMetrics {
            allocations: Allocations {
                stablecoins: 0.2,
                bluechip: 0.5,
                defi: 0.1,
                other: 0.2,
            },
            chain_count: 5,
            protocol_count: 3,
            concentration: 0.4,
            ..WalletMetrics::default()
        };
        let vec = SimilarityVector::from_metrics(&m, &SimilarityConfig::default());
        assert_eq!(vec.len(), VECTOR_DIMENSIONS);
        assert_eq!(vec.components(), &[0.2, 0.5, 0.1, 0.5, 0.2, 0.4]);
    }

    #[test]
    fn test_self_similarity_is_one() {
        let a = v(&[0.2, 0.5, 0.1, 0.3, 0.2, 0.4]);
        let score = cosine_similarity(&a, &a).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_magnitude_scores_zero() {
        let zero = v(&[0.0; 6]);
        let a = v(&[0.2, 0.5, 0.1, 0.3, 0.2, 0.4]);
        assert_eq!(cosine_similarity(&zero, &a).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn test_score_is_bounded() {
        let a = v(&[1.0, -2.0, 3.0, 0.0, 0.5, -0.1]);
        let b = v(&[-1.0, 2.0, -3.0, 0.0, -0.5, 0.1]);
        let score = cosine_similarity(&a, &b).unwrap();
        assert!((-1.0..=1.0).contains(&score));
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let err = cosine_similarity(&v(&[1.0; 6]), &v(&[1.0; 5])).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidVector {
                expected: 6,
                actual: 5
            }
        );

        let population = vec![make_candidate("0xbad", &[1.0; 7])];
        let result = find_similar("0xme", &v(&[1.0; 6]), &population, &SimilarityConfig::default());
        assert!(matches!(result, Err(AnalysisError::InvalidVector { .. })));
    }

    #[test]
    fn test_nan_component_is_an_error() {
        let err = cosine_similarity(&v(&[f64::NAN, 1.0]), &v(&[1.0, 1.0])).unwrap_err();
        assert!(matches!(err, AnalysisError::NonFinite { .. }));
    }

    #[test]
    fn test_below_floor_excluded_both_directions() {
        // cos = 0.3 exactly is not a match.
        let a = v(&[1.0, 0.0]);
        let b = v(&[0.3, (1.0f64 - 0.09).sqrt()]);
        let score = cosine_similarity(&a, &b).unwrap();
        assert!(score <= 0.3 + 1e-12);

        let config = SimilarityConfig {
            min_score: score,
            ..SimilarityConfig::default()
        };
        let from_a = find_similar("a", &a, &[make_candidate("b", b.components())], &config).unwrap();
        let from_b = find_similar("b", &b, &[make_candidate("a", a.components())], &config).unwrap();
        assert!(from_a.is_empty());
        assert!(from_b.is_empty());

        let orthogonal = v(&[0.0, 1.0]);
        let edges = find_similar(
            "a",
            &a,
            &[make_candidate("o", orthogonal.components())],
            &SimilarityConfig::default(),
        )
        .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn test_query_address_skipped_case_insensitively() {
        let q = [0.2, 0.5, 0.1, 0.3, 0.2, 0.4];
        let population = vec![
            make_candidate("0xABC", &q),
            make_candidate("0xdef", &q),
        ];
        let edges = find_similar("0xabc", &v(&q), &population, &SimilarityConfig::default()).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_address, "0xdef");
        assert_eq!(edges[0].source_address, "0xabc");
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let q = [1.0, 0.0, 0.0];
        let population = vec![
            make_candidate("tie-first", &[1.0, 1.0, 0.0]),
            make_candidate("best", &[1.0, 0.0, 0.0]),
            make_candidate("tie-second", &[2.0, 2.0, 0.0]),
            make_candidate("noise", &[0.0, 0.0, 1.0]),
        ];
        let edges = find_similar("me", &v(&q), &population, &SimilarityConfig::default()).unwrap();
        let targets: Vec<&str> = edges.iter().map(|e| e.target_address.as_str()).collect();
        assert_eq!(targets, vec!["best", "tie-first", "tie-second"]);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let population: Vec<SimilarityCandidate> = (0..30i32)
            .map(|i| make_candidate(&format!("0x{i:02}"), &[1.0, f64::from(i) / 100.0]))
            .collect();
        let edges = find_similar("me", &v(&[1.0, 0.0]), &population, &SimilarityConfig::default())
            .unwrap();
        assert_eq!(edges.len(), 20);
        assert_eq!(edges[0].target_address, "0x00");
        assert!(edges.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_population_yields_no_edges() {
        let edges = find_similar("me", &v(&[1.0; 6]), &[], &SimilarityConfig::default()).unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn test_watchers_of() {
        let edge = |s: &str, t: &str| SimilarityEdge {
            source_address: s.to_string(),
            target_address: t.to_string(),
            score: 0.9,
        };
        let edges = vec![
            edge("0xa", "0xtarget"),
            edge("0xb", "0xother"),
            edge("0xc", "0xTARGET"),
            edge("0xA", "0xtarget"),
        ];
        assert_eq!(watchers_of(&edges, "0xtarget"), vec!["0xa", "0xc"]);
        assert!(watchers_of(&edges, "0xnobody").is_empty());
    }
}
