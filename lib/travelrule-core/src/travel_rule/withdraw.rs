use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::WITHDRAW_APPLY;
use crate::client::{ApiClientError, QuestionnaireEncoding, RequestParams, ServiceCall};

/// Travel-rule questionnaire attached to a withdrawal.
///
/// Optional fields left to `None` are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawQuestionnaire {
    /// Whether the destination address belongs to the sender (`1`) or not (`2`).
    pub is_address_owner: i32,
    /// Beneficiary type: individual (`1`) or corporate (`2`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bnf_type: Option<i32>,
    /// Beneficiary name, for an individual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bnf_name: Option<String>,
    /// Beneficiary country of residence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Beneficiary corporate name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bnf_corp_name: Option<String>,
    /// Beneficiary corporate country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bnf_corp_country: Option<String>,
    /// Destination kind: private wallet (`1`) or VASP (`2`).
    pub send_to: i32,
    /// Identifier of the receiving VASP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vasp: Option<String>,
    /// Name of the receiving VASP, when not listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vasp_name: Option<String>,
    /// The sender's declaration that the information is accurate.
    pub declaration: bool,
}

/// Outcome of a travel-rule withdrawal submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRuleWithdrawResponse {
    /// The travel-rule record identifier.
    #[serde(rename = "trId")]
    pub id: i64,
    /// Whether the questionnaire was accepted.
    pub accepted: bool,
    /// Additional information from the exchange.
    pub info: String,
}

/// Builder for `POST /sapi/v1/localentity/withdraw/apply`.
///
/// `coin`, `address`, `amount` and `questionnaire` are mandatory.
///
/// # Example
///
/// ```rust
/// use travelrule_core::ApiClient;
/// use travelrule_core::test_transport::{MockResponse, MockTransport};
/// use travelrule_core::travel_rule::WithdrawQuestionnaire;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let transport = MockTransport::new();
/// # transport.push_response(MockResponse::json(r#"{"trId":1,"accepted":true,"info":""}"#));
/// # let client = ApiClient::with_transport(transport);
/// let questionnaire = WithdrawQuestionnaire {
///     is_address_owner: 1,
///     send_to: 1,
///     declaration: true,
///     ..Default::default()
/// };
///
/// let response = client
///     .new_travel_rule_withdraw()
///     .coin("USDT")
///     .network("TRX")
///     .address("TQ4bQ5qr1Dm3xkW6bZ8Q5m9z7vT5h7Xx1p")
///     .amount("25.5")
///     .questionnaire(questionnaire)
///     .await?;
///
/// assert!(response.accepted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TravelRuleWithdrawService {
    call: ServiceCall,
    coin: Option<String>,
    withdraw_order_id: Option<String>,
    network: Option<String>,
    address: Option<String>,
    address_tag: Option<String>,
    amount: Option<String>,
    transaction_fee_flag: Option<bool>,
    name: Option<String>,
    wallet_type: Option<i32>,
    timestamp: Option<i64>,
    recv_window: Option<i64>,
    questionnaire: Option<WithdrawQuestionnaire>,
    questionnaire_encoding: QuestionnaireEncoding,
}

impl TravelRuleWithdrawService {
    pub(crate) fn new(call: ServiceCall) -> Self {
        Self {
            call,
            coin: None,
            withdraw_order_id: None,
            network: None,
            address: None,
            address_tag: None,
            amount: None,
            transaction_fee_flag: None,
            name: None,
            wallet_type: None,
            timestamp: None,
            recv_window: None,
            questionnaire: None,
            questionnaire_encoding: QuestionnaireEncoding::default(),
        }
    }

    /// Sets the coin to withdraw (mandatory).
    pub fn coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }

    /// Sets a client-side identifier for the withdrawal.
    pub fn withdraw_order_id(mut self, withdraw_order_id: impl Into<String>) -> Self {
        self.withdraw_order_id = Some(withdraw_order_id.into());
        self
    }

    /// Sets the network. The coin's default network is used otherwise.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Sets the destination address (mandatory).
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the secondary address identifier (memo, tag).
    pub fn address_tag(mut self, address_tag: impl Into<String>) -> Self {
        self.address_tag = Some(address_tag.into());
        self
    }

    /// Sets the amount, as a decimal string (mandatory).
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// For internal transfers, `true` charges the fee to the destination account.
    pub fn transaction_fee_flag(mut self, transaction_fee_flag: bool) -> Self {
        self.transaction_fee_flag = Some(transaction_fee_flag);
        self
    }

    /// Sets the address book description of the destination.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the source wallet: `0` spot, `1` funding.
    pub fn wallet_type(mut self, wallet_type: i32) -> Self {
        self.wallet_type = Some(wallet_type);
        self
    }

    /// Sets the request timestamp in milliseconds. The current time is used otherwise.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the `recvWindow` parameter in milliseconds.
    pub fn recv_window(mut self, recv_window: i64) -> Self {
        self.recv_window = Some(recv_window);
        self
    }

    /// Sets the travel-rule questionnaire (mandatory).
    pub fn questionnaire(mut self, questionnaire: WithdrawQuestionnaire) -> Self {
        self.questionnaire = Some(questionnaire);
        self
    }

    /// Sets how the questionnaire JSON is encoded. Defaults to percent-encoded.
    pub fn questionnaire_encoding(mut self, encoding: QuestionnaireEncoding) -> Self {
        self.questionnaire_encoding = encoding;
        self
    }

    /// Overrides `recvWindow` for this call only, whatever the field or client default.
    pub fn with_recv_window(mut self, recv_window: i64) -> Self {
        self.call.set_recv_window(recv_window);
        self
    }

    /// Fails the call with [`ApiClientError::Timeout`] if it takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call.set_timeout(timeout);
        self
    }

    /// Assembles the request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::MissingParameter`] for the first mandatory
    /// field not set, or [`ApiClientError::SerializationError`] if the
    /// questionnaire cannot be encoded.
    pub fn params(&self) -> Result<RequestParams, ApiClientError> {
        let coin = required("coin", self.coin.as_deref())?;
        let address = required("address", self.address.as_deref())?;
        let amount = required("amount", self.amount.as_deref())?;
        let questionnaire = required("questionnaire", self.questionnaire.as_ref())?;
        let questionnaire = self.questionnaire_encoding.encode(questionnaire)?;

        let mut params = RequestParams::new();
        params
            .insert("coin", coin)
            .insert_opt("withdrawOrderId", self.withdraw_order_id.clone())
            .insert_opt("network", self.network.clone())
            .insert("address", address)
            .insert_opt("addressTag", self.address_tag.clone())
            .insert("amount", amount)
            .insert_opt("transactionFeeFlag", self.transaction_fee_flag)
            .insert_opt("name", self.name.clone())
            .insert_opt("walletType", self.wallet_type)
            .insert("questionnaire", questionnaire)
            .insert_opt("timestamp", self.timestamp)
            .insert_opt("recvWindow", self.recv_window);
        Ok(params)
    }

    /// Sends the withdrawal.
    ///
    /// # Errors
    ///
    /// Fails on a missing mandatory field (no request is sent), on a transport
    /// failure, or if the response cannot be decoded.
    pub async fn send(self) -> Result<TravelRuleWithdrawResponse, ApiClientError> {
        let params = self.params()?;
        debug!(coin = ?self.coin, network = ?self.network, "submitting travel-rule withdrawal");
        self.call.execute(WITHDRAW_APPLY, params).await
    }
}

impl IntoFuture for TravelRuleWithdrawService {
    type Output = Result<TravelRuleWithdrawResponse, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

pub(super) fn required<'a, T: ?Sized>(
    name: &'static str,
    value: Option<&'a T>,
) -> Result<&'a T, ApiClientError> {
    value.ok_or(ApiClientError::MissingParameter { name })
}
