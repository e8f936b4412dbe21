use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use http::Uri;
use http::uri::{PathAndQuery, Scheme};
use tracing::debug;
use url::Url;

use super::{ApiClient, ApiClientError, Credentials, HttpTransport, Transport};

const DEFAULT_HOST: &str = "api.binance.com";
const DEFAULT_PORT: u16 = 443;

/// Builder for creating [`ApiClient`] instances.
///
/// # Default Configuration
///
/// - **Scheme**: HTTPS
/// - **Host**: `api.binance.com`
/// - **Port**: 443
/// - **Base path**: None (endpoint paths are absolute)
/// - **Credentials**: None (signed calls fail with `MissingCredentials`)
/// - **recvWindow**: None (the exchange default applies)
/// - **Timeout**: None
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use http::uri::Scheme;
/// use travelrule_core::{ApiClient, Credentials};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_scheme(Scheme::HTTP)
///     .with_host("localhost")
///     .with_port(8080)
///     .with_credentials(Credentials::new("api-key", "secret"))
///     .with_recv_window(5_000)
///     .with_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    client: Option<reqwest::Client>,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    credentials: Option<Credentials>,
    recv_window: Option<i64>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    /// Builds the [`ApiClient`].
    ///
    /// When a custom transport was given with [`with_transport`](Self::with_transport),
    /// it is used as is and the network settings are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the base URL cannot be built from the scheme, host, port and
    /// base path, or if the HTTP client cannot be created.
    pub fn build(mut self) -> Result<ApiClient, ApiClientError> {
        if let Some(transport) = self.transport.take() {
            return Ok(ApiClient { transport });
        }

        let base_url = self.base_url()?;
        let Self {
            client,
            credentials,
            recv_window,
            timeout,
            ..
        } = self;

        let client = match client {
            Some(client) => client,
            None => {
                let builder = reqwest::Client::builder();
                let builder = match timeout {
                    Some(timeout) => builder.timeout(timeout),
                    None => builder,
                };
                builder.build()?
            }
        };

        debug!(%base_url, signed = credentials.is_some(), "client configured");
        let transport = HttpTransport::new(client, base_url, credentials, recv_window);

        Ok(ApiClient {
            transport: Arc::new(transport),
        })
    }

    fn base_url(&self) -> Result<Url, ApiClientError> {
        let builder = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(format!("{}:{}", self.host, self.port));
        let builder = if let Some(path) = &self.base_path {
            builder.path_and_query(path.path())
        } else {
            builder.path_and_query("/")
        };
        let base_uri = builder.build()?;
        let base_url = base_uri.to_string().parse::<Url>()?;
        Ok(base_url)
    }

    /// Sets the HTTP scheme. Defaults to HTTPS.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the host name. Defaults to `api.binance.com`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port. Defaults to `443`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a path prefix placed before every endpoint path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBasePath`] if the path contains invalid
    /// characters (such as spaces) or cannot be parsed as a URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, ApiClientError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| ApiClientError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets the credentials used to sign requests.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the default `recvWindow` (milliseconds) for signed requests.
    ///
    /// Requests that already carry a `recvWindow` keep their own value.
    pub fn with_recv_window(mut self, recv_window: i64) -> Self {
        self.recv_window = Some(recv_window);
        self
    }

    /// Sets a timeout applied to every HTTP request.
    ///
    /// Ignored when a custom client is set with [`with_client`](Self::with_client);
    /// configure the timeout on that client instead.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a preconfigured [`reqwest::Client`].
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Uses a custom [`Transport`] instead of HTTP.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            scheme: Scheme::HTTPS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            base_path: None,
            credentials: None,
            recv_window: None,
            timeout: None,
            transport: None,
        }
    }
}
