use chrono::Utc;
use domain::{
    CreateTodoRequest, TodoError, TodoId, TodoItem, TodoResult, UpdateTodoRequest, UserId,
};
use infrastructure::{pagination, TodoStore};
use serde::Serialize;
use shared::Config;
use tracing::{info, instrument, warn};

/// Where attachment objects live: `https://<bucket>.<domain>/<todoId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLocation {
    bucket: String,
    domain: String,
}

impl AttachmentLocation {
    pub fn new(bucket: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: domain.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.attachments_bucket.clone(),
            config.attachments_domain.clone(),
        )
    }

    pub fn url_for(&self, todo_id: &TodoId) -> String {
        format!("https://{}.{}/{}", self.bucket, self.domain, todo_id)
    }
}

/// One page of a user's todos, ready to be returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub items: Vec<TodoItem>,
    pub next_key: Option<String>,
}

pub struct TodoService<S> {
    store: S,
    attachments: AttachmentLocation,
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: S, attachments: AttachmentLocation) -> Self {
        Self { store, attachments }
    }

    #[instrument(skip(self, page_token), fields(user_id = %user_id))]
    pub async fn list(
        &self,
        user_id: &UserId,
        limit: Option<i64>,
        page_token: Option<&str>,
    ) -> TodoResult<TodoList> {
        let limit = match limit {
            Some(l) if l <= 0 => return Err(TodoError::InvalidQueryParameter("limit".to_string())),
            Some(l) => Some(
                i32::try_from(l)
                    .map_err(|_| TodoError::InvalidQueryParameter("limit".to_string()))?,
            ),
            None => None,
        };

        let start = pagination::decode(page_token).map_err(|e| {
            warn!(error = %e, "Rejected page token");
            TodoError::InvalidQueryParameter("nextKey".to_string())
        })?;

        if let Some(position) = &start {
            if !position.belongs_to(user_id) {
                warn!("Page token was issued for another user");
                return Err(TodoError::InvalidQueryParameter("nextKey".to_string()));
            }
        }

        let page = self.store.list_by_user(user_id, limit, start).await?;

        Ok(TodoList {
            next_key: pagination::encode(page.last_position.as_ref()),
            items: page.items,
        })
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create(&self, user_id: &UserId, request: CreateTodoRequest) -> TodoResult<TodoItem> {
        request.validate()?;

        let item = TodoItem::new(user_id.clone(), request, Utc::now());
        let stored = self.store.create(item).await?;

        info!(todo_id = %stored.todo_id, "Todo created");
        Ok(stored)
    }

    #[instrument(skip(self, request), fields(user_id = %user_id, todo_id = %todo_id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        request: &UpdateTodoRequest,
    ) -> TodoResult<()> {
        request.validate()?;
        self.store.update(user_id, todo_id, request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, todo_id = %todo_id))]
    pub async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> TodoResult<()> {
        self.store.delete(user_id, todo_id).await?;
        Ok(())
    }

    pub async fn exists(&self, user_id: &UserId, todo_id: &TodoId) -> TodoResult<bool> {
        Ok(self.get(user_id, todo_id).await?.is_some())
    }

    pub async fn get(&self, user_id: &UserId, todo_id: &TodoId) -> TodoResult<Option<TodoItem>> {
        Ok(self.store.get(user_id, todo_id).await?)
    }

    /// Records the attachment URL on the item and returns it. The object
    /// itself is uploaded by the client and never checked here.
    #[instrument(skip(self), fields(user_id = %user_id, todo_id = %todo_id))]
    pub async fn add_attachment(&self, user_id: &UserId, todo_id: &TodoId) -> TodoResult<String> {
        let url = self.attachments.url_for(todo_id);
        self.store.set_attachment_url(user_id, todo_id, &url).await?;

        info!(url = %url, "Attachment URL recorded");
        Ok(url)
    }
}
