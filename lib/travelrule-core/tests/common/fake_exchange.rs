#![allow(dead_code, missing_docs, clippy::expect_used)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use http::uri::Scheme;
use tracing::info;

use travelrule_core::{API_KEY_HEADER, ApiClient, Credentials};

pub const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
pub const SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

/// Deposit history filter value making the exchange answer late.
pub const SLOW_COIN: &str = "SLOW";

const WITHDRAW_RESPONSE: &str = r#"{"trId": 123, "accepted": true, "info": "ok"}"#;
const PROVIDE_INFO_RESPONSE: &str = r#"{"trId": 765, "accepted": true, "info": "Success"}"#;
const DEPOSIT_HISTORY_RESPONSE: &str = r#"[
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
        "questionnaire": {"depositOriginator": 2, "orgType": 1}
    }
]"#;

/// A request as seen by the fake exchange.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub api_key: Option<String>,
}

impl RecordedRequest {
    /// Decoded query parameters, in order.
    pub fn params(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Decoded value of a query parameter.
    pub fn param(&self, name: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }
}

#[derive(Debug, Clone, Default)]
struct ExchangeState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local server emulating the travel-rule endpoints.
///
/// Requests are authenticated like the real exchange: the API key header must
/// match [`API_KEY`] and the signature must be the HMAC-SHA256 of the query
/// with [`SECRET`].
#[derive(Debug)]
pub struct FakeExchange {
    addr: SocketAddr,
    state: ExchangeState,
}

impl FakeExchange {
    pub async fn start() -> anyhow::Result<Self> {
        let state = ExchangeState::default();
        let router = Router::new()
            .route("/sapi/v1/localentity/withdraw/apply", post(withdraw_apply))
            .route("/sapi/v1/localentity/deposit/history", get(deposit_history))
            .route(
                "/sapi/v1/localentity/deposit/provide-info",
                put(deposit_provide_info),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding fake exchange")?;
        let addr = listener.local_addr()?;
        info!(%addr, "fake exchange listening");

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router).await {
                tracing::error!(?error, "fake exchange stopped");
            }
        });

        Ok(Self { addr, state })
    }

    /// A client targeting this exchange with valid credentials.
    pub fn client(&self) -> ApiClient {
        self.client_with(Some(Credentials::new(API_KEY, SECRET)))
    }

    /// A client targeting this exchange with the given credentials.
    pub fn client_with(&self, credentials: Option<Credentials>) -> ApiClient {
        let builder = ApiClient::builder()
            .with_scheme(Scheme::HTTP)
            .with_host(self.addr.ip().to_string())
            .with_port(self.addr.port())
            .with_recv_window(5_000);
        let builder = match credentials {
            Some(credentials) => builder.with_credentials(credentials),
            None => builder,
        };
        builder.build().expect("valid client")
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("requests lock")
            .clone()
    }
}

async fn withdraw_apply(
    State(state): State<ExchangeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match state.authenticate(method, &uri, &headers) {
        Ok(_) => json_response(StatusCode::OK, WITHDRAW_RESPONSE),
        Err(rejection) => rejection,
    }
}

async fn deposit_history(
    State(state): State<ExchangeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match state.authenticate(method, &uri, &headers) {
        Ok(request) => {
            if request.param("coin").as_deref() == Some(SLOW_COIN) {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            json_response(StatusCode::OK, DEPOSIT_HISTORY_RESPONSE)
        }
        Err(rejection) => rejection,
    }
}

async fn deposit_provide_info(
    State(state): State<ExchangeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match state.authenticate(method, &uri, &headers) {
        Ok(request) if request.param("questionnaire").is_none() => json_response(
            StatusCode::BAD_REQUEST,
            r#"{"code": -1102, "msg": "Mandatory parameter 'questionnaire' was not sent."}"#,
        ),
        Ok(_) => json_response(StatusCode::OK, PROVIDE_INFO_RESPONSE),
        Err(rejection) => rejection,
    }
}

impl ExchangeState {
    fn authenticate(
        &self,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<RecordedRequest, Response> {
        let request = RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            api_key: headers
                .get(API_KEY_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string),
        };
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if request.api_key.as_deref() != Some(API_KEY) {
            return Err(json_response(
                StatusCode::UNAUTHORIZED,
                r#"{"code": -2015, "msg": "Invalid API-key, IP, or permissions for action."}"#,
            ));
        }

        let Some((payload, signature)) = request.query.rsplit_once("&signature=") else {
            return Err(json_response(
                StatusCode::BAD_REQUEST,
                r#"{"code": -1102, "msg": "Mandatory parameter 'signature' was not sent."}"#,
            ));
        };
        let expected = Credentials::new(API_KEY, SECRET)
            .sign(payload)
            .expect("valid secret");
        if signature != expected {
            return Err(json_response(
                StatusCode::UNAUTHORIZED,
                r#"{"code": -1022, "msg": "Signature for this request is not valid."}"#,
            ));
        }

        Ok(request)
    }
}

fn json_response(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
