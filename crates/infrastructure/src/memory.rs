use async_trait::async_trait;
use domain::{TodoId, TodoItem, UpdateTodoRequest, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::models::attributes;
use crate::pagination::ResumePosition;
use crate::store::{StoreError, TodoPage, TodoStore};

type Table = HashMap<(UserId, TodoId), TodoItem>;

/// A [`TodoStore`] kept in process memory. Listing follows the same order as
/// the DynamoDB index (`dueDate`, then `todoId`) and hands out the same kind
/// of resume positions.
#[derive(Default)]
pub struct InMemoryTodoStore {
    items: Mutex<Table>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::DynamoDb("in-memory table lock poisoned".to_string()))
    }
}

fn sort_key(item: &TodoItem) -> (&str, &str) {
    (item.due_date.as_str(), item.todo_id.as_str())
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<i32>,
        start: Option<ResumePosition>,
    ) -> Result<TodoPage, StoreError> {
        let items = self.lock()?;

        let mut owned: Vec<&TodoItem> = items
            .values()
            .filter(|item| &item.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        if let Some(start) = &start {
            let after = (
                start.get(attributes::DUE_DATE).unwrap_or_default(),
                start.get(attributes::TODO_ID).unwrap_or_default(),
            );
            owned.retain(|item| sort_key(item) > after);
        }

        let page_size = limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(owned.len());
        let has_more = owned.len() > page_size;
        let page: Vec<TodoItem> = owned.into_iter().take(page_size).cloned().collect();

        let last_position = if has_more {
            page.last().map(ResumePosition::after)
        } else {
            None
        };

        debug!(user_id = %user_id, count = page.len(), has_more, "Listed in-memory todos");

        Ok(TodoPage {
            items: page,
            last_position,
        })
    }

    async fn create(&self, item: TodoItem) -> Result<TodoItem, StoreError> {
        self.lock()?.insert(
            (item.user_id.clone(), item.todo_id.clone()),
            item.clone(),
        );
        Ok(item)
    }

    async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        fields: &UpdateTodoRequest,
    ) -> Result<(), StoreError> {
        // like an UpdateItem on a missing key, this is a silent no-op here
        if let Some(item) = self.lock()?.get_mut(&(user_id.clone(), todo_id.clone())) {
            item.name = fields.name.clone();
            item.due_date = fields.due_date.clone();
            item.done = fields.done;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError> {
        self.lock()?.remove(&(user_id.clone(), todo_id.clone()));
        Ok(())
    }

    async fn get(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, StoreError> {
        Ok(self
            .lock()?
            .get(&(user_id.clone(), todo_id.clone()))
            .cloned())
    }

    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<(), StoreError> {
        if let Some(item) = self.lock()?.get_mut(&(user_id.clone(), todo_id.clone())) {
            item.attachment_url = Some(url.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::CreateTodoRequest;

    fn user(id: &str) -> UserId {
        UserId::from_string(id.to_string()).unwrap()
    }

    fn todo(owner: &str, name: &str, due_date: &str) -> TodoItem {
        TodoItem::new(
            user(owner),
            CreateTodoRequest {
                name: name.to_string(),
                due_date: due_date.to_string(),
            },
            Utc::now(),
        )
    }

    async fn seeded() -> InMemoryTodoStore {
        let store = InMemoryTodoStore::new();
        for (owner, name, due) in [
            ("u1", "c", "2024-03-01"),
            ("u1", "a", "2024-01-01"),
            ("u2", "other", "2024-01-15"),
            ("u1", "b", "2024-02-01"),
        ] {
            store.create(todo(owner, name, due)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered_by_due_date() {
        let store = seeded().await;

        let page = store.list_by_user(&user("u1"), None, None).await.unwrap();

        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(page.last_position.is_none());
    }

    #[tokio::test]
    async fn test_list_pages_without_gaps_or_duplicates() {
        let store = seeded().await;
        let u1 = user("u1");

        let first = store.list_by_user(&u1, Some(2), None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let position = first.last_position.clone().unwrap();
        assert!(position.belongs_to(&u1));

        let second = store.list_by_user(&u1, Some(2), Some(position)).await.unwrap();
        let names: Vec<_> = second.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["c"]);
        assert!(second.last_position.is_none());
    }

    #[tokio::test]
    async fn test_paging_through_equal_due_dates_returns_each_item_once() {
        let store = InMemoryTodoStore::new();
        let u1 = user("u1");
        let mut created = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let item = store.create(todo("u1", name, "2024-01-01")).await.unwrap();
            created.push(item.todo_id);
        }

        let mut seen = Vec::new();
        let mut start = None;
        loop {
            let page = store.list_by_user(&u1, Some(1), start).await.unwrap();
            assert!(page.items.len() <= 1);
            seen.extend(page.items.into_iter().map(|t| t.todo_id));
            match page.last_position {
                Some(position) => start = Some(position),
                None => break,
            }
        }

        created.sort();
        let mut sorted_seen = seen.clone();
        sorted_seen.sort();
        sorted_seen.dedup();
        assert_eq!(seen.len(), 4);
        assert_eq!(sorted_seen, created);
    }

    #[tokio::test]
    async fn test_update_and_attachment_of_missing_item_are_no_ops() {
        let store = seeded().await;
        let ghost = TodoId::new();

        store
            .update(
                &user("u1"),
                &ghost,
                &UpdateTodoRequest {
                    name: "x".to_string(),
                    due_date: "2024-01-01".to_string(),
                    done: true,
                },
            )
            .await
            .unwrap();
        store
            .set_attachment_url(&user("u1"), &ghost, "https://bkt.s3.amazonaws.com/x")
            .await
            .unwrap();

        assert_eq!(store.len().unwrap(), 4);
        assert!(store.get(&user("u1"), &ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_items_are_invisible_to_other_users() {
        let store = InMemoryTodoStore::new();
        let item = store.create(todo("u1", "mine", "2024-01-01")).await.unwrap();

        assert!(store.get(&user("u2"), &item.todo_id).await.unwrap().is_none());
        store.delete(&user("u2"), &item.todo_id).await.unwrap();
        assert!(store.get(&user("u1"), &item.todo_id).await.unwrap().is_some());
    }
}
