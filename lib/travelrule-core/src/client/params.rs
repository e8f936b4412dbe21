//! Flat request parameters and questionnaire encoding.
//!
//! Every service assembles its fields into a [`RequestParams`] before the call is
//! delegated to the transport. Parameters keep their insertion order, which is the
//! order they appear on the wire and in the signed payload.

use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use super::ApiClientError;

/// Characters escaped by [`query_escape`]: everything but `A-Za-z0-9-_.~` and space.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// A scalar parameter value.
///
/// Structured values (like questionnaires) are serialized to a [`ParamValue::Text`]
/// before being added to the parameter set.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum ParamValue {
    /// A string value, sent verbatim.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value, sent as `true` / `false`.
    Boolean(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// Ordered collection of request parameters.
///
/// # Examples
///
/// ```rust
/// use travelrule_core::RequestParams;
///
/// let mut params = RequestParams::new();
/// params
///     .insert("coin", "BTC")
///     .insert("limit", 10_i32)
///     .insert_opt("network", None::<String>)
///     .insert_opt("pendingQuestionnaire", Some(true));
///
/// assert!(!params.contains("network"));
/// assert_eq!(
///     params.to_query_string().unwrap(),
///     "coin=BTC&limit=10&pendingQuestionnaire=true"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: IndexMap<String, ParamValue>,
}

impl RequestParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value but keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets a parameter only when a value is present.
    ///
    /// `None` leaves the parameter set untouched: an unset field never shows up
    /// as an empty value.
    pub fn insert_opt<V>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self
    where
        V: Into<ParamValue>,
    {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Checks whether a parameter is set.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Checks if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> + '_ {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Serializes the parameters to an `application/x-www-form-urlencoded` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the pairs cannot be URL-encoded.
    pub fn to_query_string(&self) -> Result<String, ApiClientError> {
        let pairs: Vec<(&str, String)> = self
            .iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        serde_urlencoded::to_string(&pairs).map_err(ApiClientError::from)
    }
}

impl<'a> IntoIterator for &'a RequestParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = indexmap::map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// How a questionnaire JSON string is placed in the parameter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionnaireEncoding {
    /// The JSON string is inserted as is.
    Raw,
    /// The JSON string is query-escaped before insertion.
    ///
    /// The transport URL-encodes parameters again, so the questionnaire is
    /// double-encoded on the wire. The travel-rule endpoints expect this form.
    #[default]
    PercentEncoded,
}

impl QuestionnaireEncoding {
    /// Serializes `questionnaire` to JSON and applies this encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::SerializationError`] if the value cannot be
    /// represented as JSON.
    pub fn encode<T>(self, questionnaire: &T) -> Result<String, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(questionnaire).map_err(|e| {
            ApiClientError::SerializationError {
                message: format!("Failed to serialize questionnaire: {e}"),
            }
        })?;

        let result = match self {
            Self::Raw => json,
            Self::PercentEncoded => query_escape(&json),
        };
        Ok(result)
    }
}

/// Escapes a string so it can be placed in a URL query.
///
/// Unreserved characters (`A-Za-z0-9-_.~`) are kept, spaces become `+`, and
/// everything else is percent-encoded.
pub fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ESCAPE)
        .to_string()
        .replace(' ', "+")
}
