use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_ADDR: &str = "127.0.0.1:18080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_gateway=debug,tower_http=debug")),
        )
        .init();

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
        .parse()?;

    tracing::info!("Mock gateway listening on {addr}");
    mock_gateway::run(addr).await
}
