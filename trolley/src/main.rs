use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use trolley::cli::{interrupted, TrolleyCli};
use trolley::Swarm;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trolley=info"));
    FmtSubscriber::builder().with_env_filter(filter).init();

    let cli = TrolleyCli::parse();

    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.prometheus {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Serving Prometheus metrics on {addr}");
    }

    let config = cli.config()?;
    info!("Targeting {}", config.base());

    let stats = Swarm::from_config(config)?
        .run_until(interrupted(tokio::signal::ctrl_c()))
        .await?;

    println!("{stats}");

    if stats.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
