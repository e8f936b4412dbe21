//! In-memory [`Transport`] for testing code built on top of the services.
//!
//! [`MockTransport`] records every [`ApiRequest`] it receives and answers with
//! queued [`MockResponse`]s, so service builders can be exercised without a
//! network.
//!
//! # Example
//!
//! ```rust
//! use travelrule_core::ApiClient;
//! use travelrule_core::test_transport::{MockResponse, MockTransport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockTransport::new();
//! transport.push_response(MockResponse::json(r#"{"trId": 1, "accepted": true, "info": "ok"}"#));
//!
//! let client = ApiClient::with_transport(transport.clone());
//! let response = client
//!     .provide_travel_rule_deposit_info()
//!     .tran_id(42)
//!     .questionnaire(Default::default())
//!     .await?;
//!
//! assert!(response.accepted);
//! assert_eq!(transport.requests().len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::client::status_error;
use crate::{ApiClientError, ApiRequest, Transport, TransportFuture};

/// A canned answer returned by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// A successful response with the given body.
    Json(String),
    /// A non-success HTTP status, mapped to an error like the HTTP transport does.
    Status {
        /// The HTTP status code.
        status_code: u16,
        /// The response body.
        body: String,
    },
    /// Waits before answering.
    Delayed {
        /// How long to wait.
        delay: Duration,
        /// The response sent after the delay.
        response: Box<MockResponse>,
    },
}

impl MockResponse {
    /// A successful JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self::Json(body.into())
    }

    /// A failed response with the given status code.
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status_code,
            body: body.into(),
        }
    }

    /// Delays another response.
    pub fn delayed(delay: Duration, response: MockResponse) -> Self {
        Self::Delayed {
            delay,
            response: Box::new(response),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    requests: Vec<ApiRequest>,
}

/// Recording transport answering with queued responses.
///
/// Clones share the same queue and request log. When the queue is empty the
/// transport answers with a `404` status error.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a transport with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a future request.
    pub fn push_response(&self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    /// Returns the requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: ApiRequest) -> MockResponse {
        let mut state = self.lock();
        debug!(path = request.endpoint.path, "mock transport received request");
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| MockResponse::status(404, "no mock response queued"))
    }
}

async fn respond(response: MockResponse) -> Result<String, ApiClientError> {
    let mut response = response;
    loop {
        match response {
            MockResponse::Json(body) => return Ok(body),
            MockResponse::Status { status_code, body } => {
                return Err(status_error(status_code, &body));
            }
            MockResponse::Delayed { delay, response: next } => {
                tokio::time::sleep(delay).await;
                response = *next;
            }
        }
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
        let response = self.record(request);
        Box::pin(respond(response))
    }
}
