use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use http::header::HeaderValue;
use reqwest::Request;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::auth::Credentials;
use super::request::ApiRequest;
use super::ApiClientError;

pub(in crate::client) const BODY_MAX_LENGTH: usize = 1024;

/// Future returned by [`Transport::execute`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, ApiClientError>> + Send + 'a>>;

/// Sends assembled requests and returns the raw response body.
///
/// This is the single collaborator every service delegates to. Implementations
/// own connection handling and request signing; a non-success response must be
/// reported as an error, never as a body.
///
/// # Example
///
/// ```rust
/// use travelrule_core::{ApiRequest, Transport, TransportFuture};
///
/// #[derive(Debug)]
/// struct Accepting;
///
/// impl Transport for Accepting {
///     fn execute(&self, _request: ApiRequest) -> TransportFuture<'_> {
///         Box::pin(async { Ok(r#"{"trId":1,"accepted":true,"info":""}"#.to_string()) })
///     }
/// }
/// ```
pub trait Transport: Debug + Send + Sync {
    /// Sends the request and resolves to the response body.
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    code: i64,
    msg: String,
}

/// Maps a non-success response to an error.
///
/// The exchange error payload (`{"code": -1100, "msg": "..."}`) becomes an
/// [`ApiClientError::ApiError`]; anything else an
/// [`ApiClientError::UnexpectedStatusCode`] with a truncated body.
pub fn status_error(status_code: u16, body: &str) -> ApiClientError {
    if let Ok(ErrorPayload { code, msg }) = serde_json::from_str(body) {
        warn!(status_code, code, %msg, "exchange rejected request");
        return ApiClientError::ApiError {
            status_code,
            code,
            message: msg,
        };
    }

    let body = if body.len() > BODY_MAX_LENGTH {
        let truncated: String = body.chars().take(BODY_MAX_LENGTH).collect();
        format!("{truncated}... (truncated)")
    } else {
        body.to_string()
    };
    ApiClientError::UnexpectedStatusCode { status_code, body }
}

/// Default [`Transport`] over HTTP, signing requests with HMAC-SHA256.
///
/// For signed endpoints it adds, in order:
/// - `timestamp` (current time in milliseconds) if the request has none
/// - `recvWindow` from the configuration if the request has none
/// - `signature`, the hex HMAC-SHA256 of the encoded query
///
/// and sends the API key in the `X-MBX-APIKEY` header. Parameters are always
/// sent in the query string.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    recv_window: Option<i64>,
}

impl HttpTransport {
    /// Creates a transport targeting `base_url`.
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        credentials: Option<Credentials>,
        recv_window: Option<i64>,
    ) -> Self {
        Self {
            client,
            base_url,
            credentials,
            recv_window,
        }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(in crate::client) fn build_url(&self, path: &str) -> Result<Url, ApiClientError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = url.parse::<Url>()?;
        Ok(url)
    }

    pub(in crate::client) fn build_request(
        &self,
        request: ApiRequest,
    ) -> Result<Request, ApiClientError> {
        let ApiRequest {
            endpoint,
            mut params,
        } = request;

        let mut url = self.build_url(endpoint.path)?;
        let mut api_key_header = None;

        let query = if endpoint.is_signed() {
            let Some(credentials) = &self.credentials else {
                return Err(ApiClientError::MissingCredentials {
                    path: endpoint.path,
                });
            };

            if !params.contains("timestamp") {
                params.insert("timestamp", jiff::Timestamp::now().as_millisecond());
            }
            if !params.contains("recvWindow") {
                params.insert_opt("recvWindow", self.recv_window);
            }

            let payload = params.to_query_string()?;
            let signature = credentials.sign(&payload)?;
            api_key_header = Some(credentials.to_header()?);

            if payload.is_empty() {
                format!("signature={signature}")
            } else {
                format!("{payload}&signature={signature}")
            }
        } else {
            params.to_query_string()?
        };

        if !query.is_empty() {
            url.set_query(Some(&query));
        }

        let mut request = Request::new(endpoint.method, url);
        if let Some((name, value)) = api_key_header {
            request.headers_mut().insert(name, value);
        }
        request.headers_mut().insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Ok(request)
    }

    async fn exchange(&self, request: ApiRequest) -> Result<String, ApiClientError> {
        let request = self.build_request(request)?;

        debug!(method = %request.method(), path = request.url().path(), "sending...");
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        let status_code = response.status();
        let body = response.text().await?;

        if !status_code.is_success() {
            return Err(status_error(status_code.as_u16(), &body));
        }

        Ok(body)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(self.exchange(request))
    }
}
