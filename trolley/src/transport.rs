use crate::step::Step;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
#[allow(unused_imports)]
use tracing::{debug, error, trace, warn};
use trolley_core::{SwarmConfig, CONNECT_TIMEOUT, REQUEST_TIMEOUT};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
}

/// A single journey request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub step: Step,
    pub path: String,
    pub timeout: Duration,
}

impl StepRequest {
    pub fn new(step: Step, path: String) -> Self {
        Self {
            step,
            path,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn label(&self) -> &'static str {
        self.step.label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

/// Performs the journey's GET requests. Implemented over reqwest for real runs and by in-memory
/// fixtures in tests.
#[trait_variant::make(HttpTransport: Send)]
pub trait LocalHttpTransport {
    async fn get(&self, request: &StepRequest) -> Result<StepResponse, TransportError>;
}

/// Gateway client shared by every simulated user. Cloning is cheap and reuses the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base: String,
}

impl ReqwestTransport {
    pub fn new(config: &SwarmConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("trolley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base: config.base().to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &StepRequest) -> Result<StepResponse, TransportError> {
        let url = self.url(&request.path);
        trace!("GET {url}");

        let start = Instant::now();
        let response = self
            .client
            .get(&url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|err| classify(err, request.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| classify(err, request.timeout))?;

        Ok(StepResponse {
            status,
            body: body.to_vec(),
            elapsed: start.elapsed(),
        })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { timeout }
    } else {
        TransportError::Request(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_with_one_slash() {
        let config = SwarmConfig::new("http://127.0.0.1:18080/").unwrap();
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/product-service/api/products"),
            "http://127.0.0.1:18080/product-service/api/products"
        );
        assert_eq!(
            transport.url("payment-service/api/payments"),
            "http://127.0.0.1:18080/payment-service/api/payments"
        );

        let config = SwarmConfig::new("https://gateway.example/shop/").unwrap();
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/favourite-service/api/favourites"),
            "https://gateway.example/shop/favourite-service/api/favourites"
        );
    }

    #[test]
    fn requests_carry_the_fixed_timeout() {
        let request = StepRequest::new(
            Step::ViewProductDetails,
            "/product-service/api/products/3".to_string(),
        );
        assert_eq!(request.timeout, Duration::from_secs(45));
        assert_eq!(request.label(), "GET /product-service/api/products/{id}");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let config = SwarmConfig::new("http://127.0.0.1:9").unwrap();
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = StepRequest::new(
            Step::BrowseCatalogue,
            Step::BrowseCatalogue.path(None).unwrap(),
        );
        assert!(HttpTransport::get(&transport, &request).await.is_err());
    }
}
