//! Continuation tokens for paged listings.
//!
//! A token is the store's resume position rendered as canonical JSON (keys in
//! sorted order) and percent-encoded so it can travel as a query parameter.
//! Nothing outside this module depends on the position's shape.

use aws_sdk_dynamodb::types::AttributeValue;
use domain::{TodoItem, UserId};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::models::attributes;

// Same characters as JavaScript's encodeURIComponent leaves alone.
const TOKEN_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Malformed page token: {0}")]
    MalformedPageToken(String),
}

/// Where a query stopped: the key attributes of the last item returned, which
/// are exactly `userId`, `todoId` and `dueDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResumePosition(BTreeMap<String, String>);

const KEY_ATTRIBUTES: [&str; 3] = [
    attributes::USER_ID,
    attributes::TODO_ID,
    attributes::DUE_DATE,
];

impl ResumePosition {
    /// Checks the shape of a position read from outside the process.
    pub fn new(keys: BTreeMap<String, String>) -> Result<Self, PaginationError> {
        if let Some(unknown) = keys.keys().find(|k| !KEY_ATTRIBUTES.contains(&k.as_str())) {
            return Err(PaginationError::MalformedPageToken(format!(
                "unexpected key attribute {unknown}"
            )));
        }
        for name in KEY_ATTRIBUTES {
            match keys.get(name) {
                Some(value) if !value.trim().is_empty() => {}
                _ => {
                    return Err(PaginationError::MalformedPageToken(format!(
                        "missing key attribute {name}"
                    )))
                }
            }
        }
        Ok(Self(keys))
    }

    /// The position just after `item` in its owner's listing.
    pub fn after(item: &TodoItem) -> Self {
        Self(BTreeMap::from([
            (attributes::USER_ID.to_string(), item.user_id.to_string()),
            (attributes::TODO_ID.to_string(), item.todo_id.to_string()),
            (attributes::DUE_DATE.to_string(), item.due_date.clone()),
        ]))
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    /// True when the position was taken from `user_id`'s own partition.
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        self.get(attributes::USER_ID) == Some(user_id.as_str())
    }

    pub fn to_attribute_map(&self) -> HashMap<String, AttributeValue> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), AttributeValue::S(value.clone())))
            .collect()
    }

    /// Converts DynamoDB's `LastEvaluatedKey`. Every key attribute of the
    /// table and its index is a string.
    pub fn from_attribute_map(
        key: &HashMap<String, AttributeValue>,
    ) -> Result<Self, PaginationError> {
        key.iter()
            .map(|(name, value)| match value {
                AttributeValue::S(s) => Ok((name.clone(), s.clone())),
                other => Err(PaginationError::MalformedPageToken(format!(
                    "non-string key attribute {name}: {other:?}"
                ))),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .and_then(Self::new)
    }
}

/// Renders a resume position as a URL-safe token. No position, no token.
pub fn encode(position: Option<&ResumePosition>) -> Option<String> {
    let position = position?;
    // a map of strings always serializes
    let json = serde_json::to_string(position).ok()?;
    Some(utf8_percent_encode(&json, TOKEN_ENCODE_SET).to_string())
}

/// Inverse of [`encode`]. An absent or blank token means "start from the
/// beginning". Accepts the token either still percent-encoded or already
/// decoded once by the HTTP layer.
pub fn decode(token: Option<&str>) -> Result<Option<ResumePosition>, PaginationError> {
    let token = match token.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(token) => token,
    };

    let json = if token.starts_with('{') {
        token.to_string()
    } else {
        percent_decode_str(token)
            .decode_utf8()
            .map_err(|e| PaginationError::MalformedPageToken(e.to_string()))?
            .into_owned()
    };

    let keys: BTreeMap<String, String> = serde_json::from_str(&json)
        .map_err(|e| PaginationError::MalformedPageToken(e.to_string()))?;

    ResumePosition::new(keys).map(Some)
}
