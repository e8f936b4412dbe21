use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::request::{ApiRequest, Endpoint};
use super::{ApiClientError, RequestParams, Transport};

/// Per-call options and the transport shared by every service builder.
#[derive(Debug, Clone)]
pub(crate) struct ServiceCall {
    transport: Arc<dyn Transport>,
    recv_window: Option<i64>,
    timeout: Option<Duration>,
}

impl ServiceCall {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            recv_window: None,
            timeout: None,
        }
    }

    pub(crate) fn set_recv_window(&mut self, recv_window: i64) {
        self.recv_window = Some(recv_window);
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Sends the parameters to `endpoint` and decodes the response as `T`.
    pub(crate) async fn execute<T>(
        self,
        endpoint: Endpoint,
        mut params: RequestParams,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let Self {
            transport,
            recv_window,
            timeout,
        } = self;

        params.insert_opt("recvWindow", recv_window);
        trace!(path = endpoint.path, ?params, "parameters assembled");

        let path = endpoint.path;
        let exchange = transport.execute(ApiRequest { endpoint, params });
        let body = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| ApiClientError::Timeout { timeout })??,
            None => exchange.await?,
        };
        debug!(path, length = body.len(), "response received");

        decode_json(&body)
    }
}

/// Deserializes a response body, reporting the JSON path of any mismatch.
pub(crate) fn decode_json<T>(body: &str) -> Result<T, ApiClientError>
where
    T: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(|err| ApiClientError::JsonError {
        path: err.path().to_string(),
        error: err.into_inner(),
        body: body.to_string(),
    })
}
