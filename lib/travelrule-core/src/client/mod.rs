use std::sync::Arc;

use crate::travel_rule::{
    ListTravelRuleDepositsService, ProvideTravelRuleDepositInfoService, TravelRuleWithdrawService,
};

mod builder;
pub use self::builder::ApiClientBuilder;

mod auth;
pub use self::auth::{API_KEY_HEADER, AuthenticationError, Credentials, SecureString};

mod call;
pub(crate) use self::call::ServiceCall;

mod params;
pub use self::params::{ParamValue, QuestionnaireEncoding, RequestParams, query_escape};

mod request;
pub use self::request::{ApiRequest, Endpoint, SecurityType};

mod transport;
pub use self::transport::{HttpTransport, Transport, TransportFuture, status_error};

mod error;
pub use self::error::ApiClientError;

/// Entry point to the travel-rule endpoints.
///
/// `ApiClient` holds the shared [`Transport`] and hands out one service builder
/// per operation. Builders are independent: each one assembles its own
/// parameters and performs a single call.
///
/// # Example
///
/// ```rust,no_run
/// use travelrule_core::{ApiClient, Credentials};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_credentials(Credentials::from_env("BINANCE_API_KEY", "BINANCE_SECRET_KEY")?)
///     .build()?;
///
/// let deposits = client
///     .list_travel_rule_deposits()
///     .coin("USDT")
///     .pending_questionnaire(true)
///     .await?;
///
/// for deposit in deposits {
///     println!("{} {} {}", deposit.tran_id, deposit.amount, deposit.coin);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Creates a builder for configuring a client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Creates a client delegating every call to `transport`.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Submits a withdrawal together with its travel-rule questionnaire.
    ///
    /// `POST /sapi/v1/localentity/withdraw/apply`
    pub fn new_travel_rule_withdraw(&self) -> TravelRuleWithdrawService {
        TravelRuleWithdrawService::new(self.call())
    }

    /// Lists deposits with their travel-rule status.
    ///
    /// `GET /sapi/v1/localentity/deposit/history`
    pub fn list_travel_rule_deposits(&self) -> ListTravelRuleDepositsService {
        ListTravelRuleDepositsService::new(self.call())
    }

    /// Provides the travel-rule questionnaire of a received deposit.
    ///
    /// `PUT /sapi/v1/localentity/deposit/provide-info`
    pub fn provide_travel_rule_deposit_info(&self) -> ProvideTravelRuleDepositInfoService {
        ProvideTravelRuleDepositInfoService::new(self.call())
    }

    fn call(&self) -> ServiceCall {
        ServiceCall::new(Arc::clone(&self.transport))
    }
}
