//! In-memory transport for exercising the journey without a gateway.
use crate::transport::{HttpTransport, StepRequest, StepResponse, TransportError};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Fixture {
    Response { status: u16, body: String },
    /// Served in order; the last entry repeats.
    Sequence(Arc<Mutex<VecDeque<(u16, String)>>>),
    Unreachable,
}

/// Serves canned responses by exact path and remembers every path requested. Unknown paths get a
/// 404. Clones share the request log.
#[derive(Debug, Clone, Default)]
pub(crate) struct FixtureTransport {
    routes: HashMap<String, Fixture>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, path: &str, status: u16, body: Value) -> Self {
        self.raw(path, status, &body.to_string())
    }

    pub fn raw(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Fixture::Response {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Answer `path` with each response in turn, repeating the last one.
    pub fn sequence(mut self, path: &str, responses: Vec<(u16, String)>) -> Self {
        self.routes.insert(
            path.to_string(),
            Fixture::Sequence(Arc::new(Mutex::new(responses.into()))),
        );
        self
    }

    /// Requests to `path` fail as if the gateway never answered.
    pub fn unreachable(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Fixture::Unreachable);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl HttpTransport for FixtureTransport {
    async fn get(&self, request: &StepRequest) -> Result<StepResponse, TransportError> {
        self.requested.lock().unwrap().push(request.path.clone());

        match self.routes.get(&request.path) {
            Some(Fixture::Response { status, body }) => Ok(StepResponse {
                status: *status,
                body: body.clone().into_bytes(),
                elapsed: Duration::from_millis(1),
            }),
            Some(Fixture::Sequence(responses)) => {
                let mut responses = responses.lock().unwrap();
                let (status, body) = if responses.len() > 1 {
                    responses.pop_front().unwrap()
                } else {
                    responses.front().cloned().unwrap_or((404, String::new()))
                };
                Ok(StepResponse {
                    status,
                    body: body.into_bytes(),
                    elapsed: Duration::from_millis(1),
                })
            }
            Some(Fixture::Unreachable) => Err(TransportError::Timeout {
                timeout: request.timeout,
            }),
            None => Ok(StepResponse {
                status: 404,
                body: b"not found".to_vec(),
                elapsed: Duration::from_millis(1),
            }),
        }
    }
}
