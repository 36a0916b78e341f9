//! Shared harness for the HTTP-level tests: a mock gateway on an ephemeral port and clients
//! pointed at it.
use mock_gateway::GatewayState;
use std::net::SocketAddr;
use std::sync::OnceLock;
use trolley::ReqwestTransport;
use trolley_core::SwarmConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub use mock_gateway::{FAVOURITES, PAYMENTS, PRODUCT, PRODUCTS, SHIPPINGS};

pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub struct Gateway {
    pub state: GatewayState,
    pub addr: SocketAddr,
}

impl Gateway {
    pub async fn start() -> anyhow::Result<Self> {
        init();
        let state = GatewayState::new();
        let addr = mock_gateway::spawn(state.clone()).await?;
        Ok(Self { state, addr })
    }

    /// Base URL with a trailing slash, as users tend to configure it.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn config(&self) -> anyhow::Result<SwarmConfig> {
        Ok(SwarmConfig::new(&self.base_url())?)
    }

    pub fn transport(&self) -> anyhow::Result<ReqwestTransport> {
        Ok(ReqwestTransport::new(&self.config()?)?)
    }
}

/// An address nothing is listening on.
pub async fn closed_addr() -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
