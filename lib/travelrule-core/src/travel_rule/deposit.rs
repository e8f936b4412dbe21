use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::withdraw::required;
use super::{DEPOSIT_HISTORY, DEPOSIT_PROVIDE_INFO};
use crate::client::{ApiClientError, QuestionnaireEncoding, RequestParams, ServiceCall};

/// A deposit with its travel-rule status.
///
/// Fields missing from the response, or sent as `null`, keep their default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelRuleDeposit {
    /// The travel-rule record identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tr_id: i64,
    /// The deposit identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tran_id: i64,
    /// Deposited amount, as a decimal string.
    #[serde(deserialize_with = "null_as_default")]
    pub amount: String,
    /// Deposited coin.
    #[serde(deserialize_with = "null_as_default")]
    pub coin: String,
    /// Network the deposit arrived on.
    #[serde(deserialize_with = "null_as_default")]
    pub network: String,
    /// Deposit status: `0` pending, `1` credited, `6` credited but cannot withdraw.
    #[serde(deserialize_with = "null_as_default")]
    pub deposit_status: i32,
    /// Travel-rule status: `0` completed, `1` pending, `2` failed.
    #[serde(deserialize_with = "null_as_default")]
    pub travel_rule_status: i32,
    /// Receiving address.
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    /// Secondary address identifier (memo, tag), empty if none.
    #[serde(deserialize_with = "null_as_default")]
    pub address_tag: String,
    /// On-chain transaction identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tx_id: String,
    /// Insertion time in milliseconds.
    #[serde(deserialize_with = "null_as_default")]
    pub insert_time: i64,
    /// `0` external transfer, `1` internal transfer.
    #[serde(deserialize_with = "null_as_default")]
    pub transfer_type: i32,
    /// Confirmations, as `current/required`.
    #[serde(deserialize_with = "null_as_default")]
    pub confirm_times: String,
    /// Confirmations required to unlock the funds.
    #[serde(deserialize_with = "null_as_default")]
    pub unlock_confirm: i32,
    /// Credited wallet: `0` spot, `1` funding.
    #[serde(deserialize_with = "null_as_default")]
    pub wallet_type: i32,
    /// Whether a questionnaire must still be provided.
    #[serde(deserialize_with = "null_as_default")]
    pub require_questionnaire: bool,
    /// The questionnaire as submitted, kept free-form.
    pub questionnaire: Option<Map<String, Value>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Builder for `GET /sapi/v1/localentity/deposit/history`.
///
/// Every filter is optional; unset filters are not sent.
#[derive(Debug, Clone)]
pub struct ListTravelRuleDepositsService {
    call: ServiceCall,
    tr_id: Option<String>,
    tx_id: Option<String>,
    tran_id: Option<String>,
    network: Option<String>,
    coin: Option<String>,
    travel_rule_status: Option<i32>,
    pending_questionnaire: Option<bool>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    offset: Option<i32>,
    limit: Option<i32>,
    timestamp: Option<i64>,
}

impl ListTravelRuleDepositsService {
    pub(crate) fn new(call: ServiceCall) -> Self {
        Self {
            call,
            tr_id: None,
            tx_id: None,
            tran_id: None,
            network: None,
            coin: None,
            travel_rule_status: None,
            pending_questionnaire: None,
            start_time: None,
            end_time: None,
            offset: None,
            limit: None,
            timestamp: None,
        }
    }

    /// Filters by travel-rule record identifiers (comma separated).
    pub fn tr_id(mut self, tr_id: impl Into<String>) -> Self {
        self.tr_id = Some(tr_id.into());
        self
    }

    /// Filters by on-chain transaction identifiers (comma separated).
    pub fn tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = Some(tx_id.into());
        self
    }

    /// Filters by deposit identifiers (comma separated).
    pub fn tran_id(mut self, tran_id: impl Into<String>) -> Self {
        self.tran_id = Some(tran_id.into());
        self
    }

    /// Filters by network.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Filters by coin.
    pub fn coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }

    /// Filters by travel-rule status: `0` completed, `1` pending, `2` failed.
    pub fn travel_rule_status(mut self, travel_rule_status: i32) -> Self {
        self.travel_rule_status = Some(travel_rule_status);
        self
    }

    /// Only deposits still waiting for a questionnaire.
    pub fn pending_questionnaire(mut self, pending_questionnaire: bool) -> Self {
        self.pending_questionnaire = Some(pending_questionnaire);
        self
    }

    /// Lower bound of the insertion time, in milliseconds.
    pub fn start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Upper bound of the insertion time, in milliseconds.
    pub fn end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Number of records to skip.
    pub fn offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Maximum number of records returned.
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the request timestamp in milliseconds. The current time is used otherwise.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Overrides `recvWindow` for this call.
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
    pub fn params(&self) -> RequestParams {
        let mut params = RequestParams::new();
        params
            .insert_opt("timestamp", self.timestamp)
            .insert_opt("trId", self.tr_id.clone())
            .insert_opt("txId", self.tx_id.clone())
            .insert_opt("tranId", self.tran_id.clone())
            .insert_opt("network", self.network.clone())
            .insert_opt("coin", self.coin.clone())
            .insert_opt("travelRuleStatus", self.travel_rule_status)
            .insert_opt("pendingQuestionnaire", self.pending_questionnaire)
            .insert_opt("startTime", self.start_time)
            .insert_opt("endTime", self.end_time)
            .insert_opt("offset", self.offset)
            .insert_opt("limit", self.limit);
        params
    }

    /// Fetches the matching deposits.
    ///
    /// # Errors
    ///
    /// Fails on a transport failure or if the response cannot be decoded.
    pub async fn send(self) -> Result<Vec<TravelRuleDeposit>, ApiClientError> {
        let params = self.params();
        let deposits: Vec<TravelRuleDeposit> = self.call.execute(DEPOSIT_HISTORY, params).await?;
        debug!(count = deposits.len(), "travel-rule deposits listed");
        Ok(deposits)
    }
}

impl IntoFuture for ListTravelRuleDepositsService {
    type Output = Result<Vec<TravelRuleDeposit>, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

/// Travel-rule questionnaire for a received deposit.
///
/// Optional fields left to `None` are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositQuestionnaire {
    /// Whether the deposit comes from the receiver (`1`) or someone else (`2`).
    pub deposit_originator: i32,
    /// Originator type: individual (`1`) or corporate (`2`).
    #[serde(default)]
    pub org_type: Option<i32>,
    /// Originator name, for an individual.
    #[serde(default)]
    pub org_name: Option<String>,
    /// Originator country of residence.
    #[serde(default)]
    pub country: Option<String>,
    /// Originator corporate name.
    #[serde(default)]
    pub corp_name: Option<String>,
    /// Originator corporate country.
    #[serde(default)]
    pub corp_country: Option<String>,
    /// Origin kind: private wallet (`1`) or VASP (`2`).
    pub receive_from: i32,
    /// Identifier of the sending VASP.
    #[serde(default)]
    pub vasp: Option<String>,
    /// Name of the sending VASP, when not listed.
    #[serde(default)]
    pub vasp_name: Option<String>,
    /// The receiver's declaration that the information is accurate.
    pub declaration: bool,
}

/// Outcome of a deposit questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvideTravelRuleDepositInfoResponse {
    /// The travel-rule record identifier.
    #[serde(rename = "trId")]
    pub id: i64,
    /// Whether the questionnaire was accepted.
    pub accepted: bool,
    /// Additional information from the exchange.
    pub info: String,
}

/// Builder for `PUT /sapi/v1/localentity/deposit/provide-info`.
///
/// `tran_id` and `questionnaire` are mandatory.
#[derive(Debug, Clone)]
pub struct ProvideTravelRuleDepositInfoService {
    call: ServiceCall,
    tran_id: Option<i64>,
    questionnaire: Option<DepositQuestionnaire>,
    timestamp: Option<i64>,
    questionnaire_encoding: QuestionnaireEncoding,
}

impl ProvideTravelRuleDepositInfoService {
    pub(crate) fn new(call: ServiceCall) -> Self {
        Self {
            call,
            tran_id: None,
            questionnaire: None,
            timestamp: None,
            questionnaire_encoding: QuestionnaireEncoding::default(),
        }
    }

    /// Sets the deposit identifier (mandatory).
    pub fn tran_id(mut self, tran_id: i64) -> Self {
        self.tran_id = Some(tran_id);
        self
    }

    /// Sets the questionnaire (mandatory).
    pub fn questionnaire(mut self, questionnaire: DepositQuestionnaire) -> Self {
        self.questionnaire = Some(questionnaire);
        self
    }

    /// Sets the request timestamp in milliseconds. The current time is used otherwise.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets how the questionnaire JSON is encoded. Defaults to percent-encoded.
    pub fn questionnaire_encoding(mut self, encoding: QuestionnaireEncoding) -> Self {
        self.questionnaire_encoding = encoding;
        self
    }

    /// Sets `recvWindow` for this call.
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
    /// Returns [`ApiClientError::MissingParameter`] if `tranId` or the
    /// questionnaire is not set, or [`ApiClientError::SerializationError`] if
    /// the questionnaire cannot be encoded.
    pub fn params(&self) -> Result<RequestParams, ApiClientError> {
        let tran_id = *required("tranId", self.tran_id.as_ref())?;
        let questionnaire = required("questionnaire", self.questionnaire.as_ref())?;
        let questionnaire = self.questionnaire_encoding.encode(questionnaire)?;

        let mut params = RequestParams::new();
        params
            .insert("tranId", tran_id)
            .insert("questionnaire", questionnaire)
            .insert_opt("timestamp", self.timestamp);
        Ok(params)
    }

    /// Sends the questionnaire.
    ///
    /// # Errors
    ///
    /// Fails on a missing mandatory field (no request is sent), on a transport
    /// failure, or if the response cannot be decoded.
    pub async fn send(self) -> Result<ProvideTravelRuleDepositInfoResponse, ApiClientError> {
        let params = self.params()?;
        debug!(tran_id = ?self.tran_id, "providing travel-rule deposit info");
        self.call.execute(DEPOSIT_PROVIDE_INFO, params).await
    }
}

impl IntoFuture for ProvideTravelRuleDepositInfoService {
    type Output = Result<ProvideTravelRuleDepositInfoResponse, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::ApiClient;
    use crate::test_transport::{MockResponse, MockTransport};

    const TWO_DEPOSITS: &str = r#"[
        {
            "trId": 564,
            "tranId": 5906513437,
            "amount": "0.0001",
            "coin": "BNB",
            "network": "BNB",
            "depositStatus": 0,
            "travelRuleStatus": 1,
            "address": "bnb136ns6lfw4zs5hg4n85vdthaad7hq5m4gtkgf23",
            "addressTag": "101764890",
            "txId": "98A3EA560C6B3336D348B6C83F0F95ECE4F1F5919E94BD006E5BF3BF264FACFC",
            "insertTime": 1661493146000,
            "transferType": 0,
            "confirmTimes": "1/1",
            "unlockConfirm": 0,
            "walletType": 0,
            "requireQuestionnaire": false,
            "questionnaire": null
        },
        {
            "trId": 565,
            "tranId": 5906513438,
            "amount": "1.5",
            "coin": "USDT",
            "network": "ETH",
            "depositStatus": 1,
            "travelRuleStatus": 0,
            "address": "0xa1b2c3",
            "addressTag": "",
            "txId": "0xdeadbeef",
            "insertTime": 1661493147000,
            "transferType": 0,
            "confirmTimes": "12/12",
            "unlockConfirm": 12,
            "walletType": 1,
            "requireQuestionnaire": true,
            "questionnaire": {"depositOriginator": 2, "orgType": 1, "nested": {"extra": [1, 2]}}
        }
    ]"#;

    fn deposit_questionnaire() -> DepositQuestionnaire {
        DepositQuestionnaire {
            deposit_originator: 1,
            receive_from: 2,
            vasp: Some("binance".to_string()),
            declaration: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_deposit_questionnaire_sends_null_for_absent_fields() {
        let json = serde_json::to_string(&deposit_questionnaire()).expect("should serialize");

        insta::assert_snapshot!(json, @r#"{"depositOriginator":1,"orgType":null,"orgName":null,"country":null,"corpName":null,"corpCountry":null,"receiveFrom":2,"vasp":"binance","vaspName":null,"declaration":true}"#);
    }

    #[test]
    fn test_deposit_questionnaire_round_trip() {
        let questionnaire = DepositQuestionnaire {
            org_type: Some(2),
            corp_name: Some("ACME".to_string()),
            corp_country: Some("DE".to_string()),
            ..deposit_questionnaire()
        };

        let json = serde_json::to_string(&questionnaire).expect("should serialize");
        let decoded: DepositQuestionnaire = serde_json::from_str(&json).expect("should decode");

        assert_eq!(decoded, questionnaire);
    }

    #[test]
    fn test_list_params_empty_by_default() {
        let client = ApiClient::with_transport(MockTransport::new());

        let params = client.list_travel_rule_deposits().params();

        assert!(params.is_empty());
    }

    #[test]
    fn test_list_params_with_filters() {
        let client = ApiClient::with_transport(MockTransport::new());

        let params = client
            .list_travel_rule_deposits()
            .timestamp(1_700_000_000_000)
            .tr_id("564,565")
            .tx_id("0xdeadbeef")
            .tran_id("5906513437")
            .network("ETH")
            .coin("USDT")
            .travel_rule_status(1)
            .pending_questionnaire(true)
            .start_time(1_661_000_000_000)
            .end_time(1_662_000_000_000)
            .offset(0)
            .limit(100)
            .params();

        insta::assert_snapshot!(params.to_query_string().expect("should encode"), @"timestamp=1700000000000&trId=564%2C565&txId=0xdeadbeef&tranId=5906513437&network=ETH&coin=USDT&travelRuleStatus=1&pendingQuestionnaire=true&startTime=1661000000000&endTime=1662000000000&offset=0&limit=100");
    }

    #[rstest]
    #[case::coin(|s: ListTravelRuleDepositsService| s.coin("BTC"), "coin")]
    #[case::offset(|s: ListTravelRuleDepositsService| s.offset(0), "offset")]
    #[case::pending(|s: ListTravelRuleDepositsService| s.pending_questionnaire(false), "pendingQuestionnaire")]
    fn test_list_params_single_filter(
        #[case] configure: fn(ListTravelRuleDepositsService) -> ListTravelRuleDepositsService,
        #[case] expected: &str,
    ) {
        let client = ApiClient::with_transport(MockTransport::new());

        let params = configure(client.list_travel_rule_deposits()).params();

        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec![expected]);
    }

    #[tokio::test]
    async fn test_list_decodes_two_deposits() {
        let transport = MockTransport::new();
        transport.push_response(MockResponse::json(TWO_DEPOSITS));
        let client = ApiClient::with_transport(transport.clone());

        let deposits = client
            .list_travel_rule_deposits()
            .pending_questionnaire(true)
            .await
            .expect("should succeed");

        assert_eq!(deposits.len(), 2);
        let first = &deposits[0];
        assert_eq!(first.tr_id, 564);
        assert_eq!(first.tran_id, 5_906_513_437);
        assert_eq!(first.amount, "0.0001");
        assert_eq!(first.address_tag, "101764890");
        assert_eq!(first.confirm_times, "1/1");
        assert_eq!(first.questionnaire, None);

        let second = &deposits[1];
        assert_eq!(second.coin, "USDT");
        assert_eq!(second.unlock_confirm, 12);
        assert!(second.require_questionnaire);
        assert_eq!(
            second.questionnaire.clone().map(Value::Object),
            Some(json!({"depositOriginator": 2, "orgType": 1, "nested": {"extra": [1, 2]}}))
        );

        let requests = transport.requests();
        assert_eq!(requests[0].endpoint, DEPOSIT_HISTORY);
    }

    #[tokio::test]
    async fn test_list_tolerates_missing_fields() {
        let transport = MockTransport::new();
        transport.push_response(MockResponse::json(r#"[{"trId": 1, "coin": "BTC"}]"#));
        let client = ApiClient::with_transport(transport);

        let deposits = client.list_travel_rule_deposits().await.expect("should succeed");

        assert_eq!(
            deposits,
            vec![TravelRuleDeposit {
                tr_id: 1,
                coin: "BTC".to_string(),
                ..Default::default()
            }]
        );
    }

    #[tokio::test]
    async fn test_list_null_fields_take_default() {
        let transport = MockTransport::new();
        transport.push_response(MockResponse::json(
            r#"[{"trId": 1, "tranId": 2, "coin": "BNB", "addressTag": null, "unlockConfirm": null, "requireQuestionnaire": null, "questionnaire": null}]"#,
        ));
        let client = ApiClient::with_transport(transport);

        let deposits = client.list_travel_rule_deposits().await.expect("should succeed");

        assert_eq!(
            deposits,
            vec![TravelRuleDeposit {
                tr_id: 1,
                tran_id: 2,
                coin: "BNB".to_string(),
                ..Default::default()
            }]
        );
    }

    #[tokio::test]
    async fn test_list_transport_error_is_propagated() {
        let transport = MockTransport::new();
        transport.push_response(MockResponse::status(500, "internal error"));
        let client = ApiClient::with_transport(transport);

        let result = client.list_travel_rule_deposits().await;

        assert!(matches!(
            result,
            Err(ApiClientError::UnexpectedStatusCode {
                status_code: 500,
                ..
            })
        ));
    }

    #[test]
    fn test_provide_params() {
        let client = ApiClient::with_transport(MockTransport::new());

        let params = client
            .provide_travel_rule_deposit_info()
            .tran_id(5_906_513_437)
            .questionnaire(deposit_questionnaire())
            .questionnaire_encoding(QuestionnaireEncoding::Raw)
            .timestamp(1_700_000_000_000)
            .params()
            .expect("should assemble");

        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["tranId", "questionnaire", "timestamp"]);
        let questionnaire = params
            .get("questionnaire")
            .map(ToString::to_string)
            .unwrap_or_default();
        let decoded: DepositQuestionnaire =
            serde_json::from_str(&questionnaire).expect("raw questionnaire is JSON");
        assert_eq!(decoded, deposit_questionnaire());
    }

    #[test]
    fn test_provide_params_percent_encodes_by_default() {
        let client = ApiClient::with_transport(MockTransport::new());

        let params = client
            .provide_travel_rule_deposit_info()
            .tran_id(1)
            .questionnaire(deposit_questionnaire())
            .params()
            .expect("should assemble");

        let questionnaire = params
            .get("questionnaire")
            .map(ToString::to_string)
            .unwrap_or_default();
        assert!(questionnaire.starts_with("%7B%22depositOriginator%22%3A1%2C"));
        assert!(!params.contains("timestamp"));
    }

    #[rstest]
    #[case::tran_id(None, Some(deposit_questionnaire()), "tranId")]
    #[case::questionnaire(Some(1), None, "questionnaire")]
    #[tokio::test]
    async fn test_provide_missing_mandatory_field_sends_nothing(
        #[case] tran_id: Option<i64>,
        #[case] questionnaire: Option<DepositQuestionnaire>,
        #[case] missing: &'static str,
    ) {
        let transport = MockTransport::new();
        let client = ApiClient::with_transport(transport.clone());
        let mut service = client.provide_travel_rule_deposit_info();
        if let Some(tran_id) = tran_id {
            service = service.tran_id(tran_id);
        }
        if let Some(questionnaire) = questionnaire {
            service = service.questionnaire(questionnaire);
        }

        let result = service.send().await;

        assert!(matches!(
            result,
            Err(ApiClientError::MissingParameter { name }) if name == missing
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_provide_decodes_response() {
        let transport = MockTransport::new();
        transport.push_response(MockResponse::json(
            r#"{"trId": 765, "accepted": true, "info": "Success"}"#,
        ));
        let client = ApiClient::with_transport(transport.clone());

        let response = client
            .provide_travel_rule_deposit_info()
            .tran_id(5_906_513_437)
            .questionnaire(deposit_questionnaire())
            .with_recv_window(10_000)
            .await
            .expect("should succeed");

        assert_eq!(
            response,
            ProvideTravelRuleDepositInfoResponse {
                id: 765,
                accepted: true,
                info: "Success".to_string(),
            }
        );
        let requests = transport.requests();
        assert_eq!(requests[0].endpoint, DEPOSIT_PROVIDE_INFO);
        assert!(requests[0].params.contains("recvWindow"));
    }
}
