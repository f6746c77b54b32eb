use anyhow::Result;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

pub fn describe() {
    describe_counter!(
        "profiler_wallets_analyzed_total",
        "Number of wallets run through the analysis pipeline."
    );
    describe_counter!(
        "profiler_personality_total",
        "Wallets classified, labelled by personality."
    );
    describe_counter!(
        "profiler_similarity_candidates_total",
        "Population entries scored against a query vector."
    );
    describe_counter!(
        "profiler_similarity_matches_total",
        "Similarity edges returned after floor and top-K."
    );
    describe_counter!(
        "profiler_comparisons_total",
        "Cohort comparisons computed."
    );
    describe_histogram!(
        "profiler_analysis_duration_ms",
        "Wall time of a single wallet analysis in milliseconds."
    );
}

pub fn install_prometheus(port: u16) -> Result<PrometheusHandle> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    Ok(PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()?)
}
