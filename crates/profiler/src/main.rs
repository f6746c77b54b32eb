use anyhow::Result;
use profiler::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let config = common::config::Config::load()?;

    let (dispatch, _otel_guard) =
        common::observability::build_dispatch("profiler", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    let cmd = cli::parse_args(std::env::args()).map_err(anyhow::Error::msg)?;

    if config.observability.prometheus_enabled {
        profiler::metrics::install_prometheus(config.observability.prometheus_port)?;
        profiler::metrics::describe();
    }

    let ctx = profiler::AnalysisContext::from_config(&config);
    tracing::info!(command = ?cmd, "wallet profiler starting");

    let output = cli::run_command(&ctx, cmd, chrono::Utc::now())?;
    println!("{output}");
    Ok(())
}
