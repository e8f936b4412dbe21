use http::Method;

use super::RequestParams;

/// How a request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    /// Public endpoint, sent as is.
    None,
    /// Requires the API key header and an HMAC signature over the parameters.
    Signed,
}

/// Static description of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the client base URL.
    pub path: &'static str,
    /// Authentication requirement.
    pub security: SecurityType,
}

impl Endpoint {
    /// Describes a signed endpoint.
    pub const fn signed(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            security: SecurityType::Signed,
        }
    }

    /// Checks whether the endpoint must be signed.
    pub fn is_signed(&self) -> bool {
        self.security == SecurityType::Signed
    }
}

/// A fully assembled request handed to a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// The operation to call.
    pub endpoint: Endpoint,
    /// The flat parameter set, without `signature`.
    pub params: RequestParams,
}
