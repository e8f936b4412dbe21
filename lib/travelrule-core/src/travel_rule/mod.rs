//! Travel-rule compliance endpoints.
//!
//! Local-entity accounts must attach a compliance questionnaire to withdrawals
//! and to received deposits. This module exposes one builder per endpoint:
//!
//! | Builder | Method | Path |
//! |---|---|---|
//! | [`TravelRuleWithdrawService`] | `POST` | `/sapi/v1/localentity/withdraw/apply` |
//! | [`ListTravelRuleDepositsService`] | `GET` | `/sapi/v1/localentity/deposit/history` |
//! | [`ProvideTravelRuleDepositInfoService`] | `PUT` | `/sapi/v1/localentity/deposit/provide-info` |
//!
//! All three are signed. Builders are obtained from the
//! [`ApiClient`](crate::ApiClient), configured with chained setters, and
//! executed with `.send().await` or a direct `.await`.

use http::Method;

use crate::client::Endpoint;

mod deposit;
pub use self::deposit::{
    DepositQuestionnaire, ListTravelRuleDepositsService, ProvideTravelRuleDepositInfoResponse,
    ProvideTravelRuleDepositInfoService, TravelRuleDeposit,
};

mod withdraw;
pub use self::withdraw::{
    TravelRuleWithdrawResponse, TravelRuleWithdrawService, WithdrawQuestionnaire,
};

/// Submits a withdrawal with its questionnaire.
pub const WITHDRAW_APPLY: Endpoint =
    Endpoint::signed(Method::POST, "/sapi/v1/localentity/withdraw/apply");

/// Lists deposits with their travel-rule status.
pub const DEPOSIT_HISTORY: Endpoint =
    Endpoint::signed(Method::GET, "/sapi/v1/localentity/deposit/history");

/// Provides the questionnaire of a deposit.
pub const DEPOSIT_PROVIDE_INFO: Endpoint =
    Endpoint::signed(Method::PUT, "/sapi/v1/localentity/deposit/provide-info");
