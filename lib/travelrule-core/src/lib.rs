//! # Travelrule Core
//!
//! Typed request builders for the exchange travel-rule compliance endpoints.
//!
//! Local-entity accounts must attach a compliance questionnaire to their
//! withdrawals and to the deposits they receive. This crate exposes one
//! builder per endpoint:
//! - **[`TravelRuleWithdrawService`](travel_rule::TravelRuleWithdrawService)** - submit a withdrawal with its questionnaire
//! - **[`ListTravelRuleDepositsService`](travel_rule::ListTravelRuleDepositsService)** - list deposits and their travel-rule status
//! - **[`ProvideTravelRuleDepositInfoService`](travel_rule::ProvideTravelRuleDepositInfoService)** - provide the questionnaire of a deposit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use travelrule_core::{ApiClient, Credentials};
//! use travelrule_core::travel_rule::WithdrawQuestionnaire;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder()
//!     .with_credentials(Credentials::new("api-key", "secret"))
//!     .with_recv_window(5_000)
//!     .build()?;
//!
//! let response = client
//!     .new_travel_rule_withdraw()
//!     .coin("BTC")
//!     .address("bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh")
//!     .amount("0.01")
//!     .questionnaire(WithdrawQuestionnaire {
//!         is_address_owner: 1,
//!         send_to: 1,
//!         declaration: true,
//!         ..Default::default()
//!     })
//!     .await?;  // ← Direct await using IntoFuture
//!
//! println!("travel-rule record {} accepted: {}", response.id, response.accepted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Requests
//!
//! Builders only send what was set: an optional field left alone never shows
//! up on the wire, and a missing mandatory field fails with
//! [`ApiClientError::MissingParameter`] before anything is sent.
//!
//! Every travel-rule endpoint is signed. The default [`HttpTransport`] adds
//! `timestamp` (unless set on the builder) and the configured `recvWindow`,
//! then signs the query with HMAC-SHA256 and sends the API key in the
//! `X-MBX-APIKEY` header.
//!
//! Questionnaires are serialized to JSON and, by default, query-escaped before
//! being added to the parameters; see [`QuestionnaireEncoding`].
//!
//! ## Testing
//!
//! The transport is a trait object, so tests can replace the network with
//! [`MockTransport`](test_transport::MockTransport) and inspect what each
//! builder sent.
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiClientError`]: validation, questionnaire
//! serialization, transport failures (including exchange error payloads), and
//! response decoding with the JSON path of the mismatch.

mod client;

pub mod test_transport;
pub mod travel_rule;

pub use self::client::{
    API_KEY_HEADER, ApiClient, ApiClientBuilder, ApiClientError, ApiRequest, AuthenticationError,
    Credentials, Endpoint, HttpTransport, ParamValue, QuestionnaireEncoding, RequestParams,
    SecureString, SecurityType, Transport, TransportFuture, query_escape, status_error,
};
