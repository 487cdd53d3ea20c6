use async_trait::async_trait;
use domain::{TodoError, TodoId, TodoItem, UpdateTodoRequest, UserId};
use std::sync::Arc;
use thiserror::Error;

use crate::pagination::ResumePosition;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Malformed item: {0}")]
    MalformedItem(String),
}

impl From<StoreError> for TodoError {
    fn from(e: StoreError) -> Self {
        TodoError::StoreFailure(e.to_string())
    }
}

/// One page of a user's items plus the position to resume from, if the store
/// has more.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPage {
    pub items: Vec<TodoItem>,
    pub last_position: Option<ResumePosition>,
}

/// Single-table access to to-do items. Every operation is scoped by the
/// owner's id; nothing here retries.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Items of one user, earliest `due_date` first.
    async fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<i32>,
        start: Option<ResumePosition>,
    ) -> Result<TodoPage, StoreError>;

    /// Unconditional put; an existing item with the same key is replaced.
    async fn create(&self, item: TodoItem) -> Result<TodoItem, StoreError>;

    /// Overwrites name, due date and done flag together.
    async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        fields: &UpdateTodoRequest,
    ) -> Result<(), StoreError>;

    /// Deleting a missing key succeeds.
    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError>;

    async fn get(&self, user_id: &UserId, todo_id: &TodoId)
        -> Result<Option<TodoItem>, StoreError>;

    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: TodoStore + ?Sized> TodoStore for Arc<T> {
    async fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<i32>,
        start: Option<ResumePosition>,
    ) -> Result<TodoPage, StoreError> {
        (**self).list_by_user(user_id, limit, start).await
    }

    async fn create(&self, item: TodoItem) -> Result<TodoItem, StoreError> {
        (**self).create(item).await
    }

    async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        fields: &UpdateTodoRequest,
    ) -> Result<(), StoreError> {
        (**self).update(user_id, todo_id, fields).await
    }

    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError> {
        (**self).delete(user_id, todo_id).await
    }

    async fn get(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, StoreError> {
        (**self).get(user_id, todo_id).await
    }

    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<(), StoreError> {
        (**self).set_attachment_url(user_id, todo_id, url).await
    }
}
