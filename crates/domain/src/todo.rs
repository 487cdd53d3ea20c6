use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: String) -> DomainResult<Self> {
        if s.trim().is_empty() {
            return Err(DomainError::InvalidTodoId(
                "Todo ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner identity, taken from the `sub` claim of the caller's token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(s: String) -> DomainResult<Self> {
        if s.trim().is_empty() {
            return Err(DomainError::InvalidUserId(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do entry. `(user_id, todo_id)` is the table key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub user_id: UserId,
    pub todo_id: TodoId,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl TodoItem {
    /// Builds a fresh item: new id, not done, no attachment.
    pub fn new(user_id: UserId, request: CreateTodoRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            todo_id: TodoId::new(),
            name: request.name.trim().to_string(),
            due_date: request.due_date,
            done: false,
            created_at,
            attachment_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_due_date(&self.due_date)
    }
}

/// Full replacement of the mutable fields. Every field is required so that an
/// omitted one is rejected instead of overwriting stored data with nothing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_due_date(&self.due_date)
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::Validation(format!(
            "name too long (max {MAX_NAME_LENGTH} characters)"
        )));
    }
    Ok(())
}

// Accepts a calendar date or a full RFC 3339 timestamp.
fn validate_due_date(due_date: &str) -> DomainResult<()> {
    let is_date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_ok();
    if is_date || DateTime::parse_from_rfc3339(due_date).is_ok() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "dueDate is not an ISO date: {due_date}"
        )))
    }
}
