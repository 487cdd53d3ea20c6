use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{TodoId, TodoItem, UserId};
use std::collections::HashMap;

use crate::store::StoreError;

/// Attribute names of the todos table.
pub mod attributes {
    pub const USER_ID: &str = "userId";
    pub const TODO_ID: &str = "todoId";
    pub const NAME: &str = "name";
    pub const DUE_DATE: &str = "dueDate";
    pub const DONE: &str = "done";
    pub const CREATED_AT: &str = "createdAt";
    pub const ATTACHMENT_URL: &str = "attachmentUrl";
}

/// Primary key of one item.
pub fn item_key(user_id: &UserId, todo_id: &TodoId) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            attributes::USER_ID.to_string(),
            AttributeValue::S(user_id.as_str().to_string()),
        ),
        (
            attributes::TODO_ID.to_string(),
            AttributeValue::S(todo_id.as_str().to_string()),
        ),
    ])
}

pub fn todo_to_item(todo: &TodoItem) -> HashMap<String, AttributeValue> {
    let mut item = item_key(&todo.user_id, &todo.todo_id);
    item.insert(
        attributes::NAME.to_string(),
        AttributeValue::S(todo.name.clone()),
    );
    item.insert(
        attributes::DUE_DATE.to_string(),
        AttributeValue::S(todo.due_date.clone()),
    );
    item.insert(attributes::DONE.to_string(), AttributeValue::Bool(todo.done));
    item.insert(
        attributes::CREATED_AT.to_string(),
        AttributeValue::S(todo.created_at.to_rfc3339()),
    );
    if let Some(url) = &todo.attachment_url {
        item.insert(
            attributes::ATTACHMENT_URL.to_string(),
            AttributeValue::S(url.clone()),
        );
    }
    item
}

pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<TodoItem, StoreError> {
    let user_id = UserId::from_string(required_string(item, attributes::USER_ID)?)
        .map_err(|e| StoreError::MalformedItem(e.to_string()))?;
    let todo_id = TodoId::from_string(required_string(item, attributes::TODO_ID)?)
        .map_err(|e| StoreError::MalformedItem(e.to_string()))?;

    let created_at = required_string(item, attributes::CREATED_AT)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StoreError::MalformedItem(format!("createdAt: {e}")))?
        .with_timezone(&Utc);

    // items written by older clients may carry a NULL or no done flag
    let done = match item.get(attributes::DONE) {
        Some(AttributeValue::Bool(done)) => *done,
        Some(AttributeValue::Null(_)) | None => false,
        Some(other) => {
            return Err(StoreError::MalformedItem(format!(
                "done is not a boolean: {other:?}"
            )))
        }
    };

    Ok(TodoItem {
        user_id,
        todo_id,
        name: required_string(item, attributes::NAME)?,
        due_date: required_string(item, attributes::DUE_DATE)?,
        done,
        created_at,
        attachment_url: item
            .get(attributes::ATTACHMENT_URL)
            .and_then(|v| v.as_s().ok())
            .cloned(),
    })
}

fn required_string(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::MalformedItem(format!("missing string attribute {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::CreateTodoRequest;

    fn sample() -> TodoItem {
        TodoItem::new(
            UserId::from_string("u1".to_string()).unwrap(),
            CreateTodoRequest {
                name: "buy milk".to_string(),
                due_date: "2024-01-01".to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_item_round_trip_keeps_every_field() {
        let mut todo = sample();
        todo.attachment_url = Some("https://bkt.s3.amazonaws.com/t1".to_string());

        let item = todo_to_item(&todo);
        assert_eq!(item.get("done"), Some(&AttributeValue::Bool(false)));
        assert_eq!(item_to_todo(&item).unwrap(), todo);
    }

    #[test]
    fn test_missing_attachment_is_not_written() {
        let item = todo_to_item(&sample());
        assert!(!item.contains_key(attributes::ATTACHMENT_URL));
        assert_eq!(item.len(), 6);
    }

    #[test]
    fn test_null_done_reads_as_false() {
        let mut item = todo_to_item(&sample());
        item.insert("done".to_string(), AttributeValue::Null(true));
        assert!(!item_to_todo(&item).unwrap().done);
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let mut item = todo_to_item(&sample());
        item.remove(attributes::NAME);
        assert!(matches!(
            item_to_todo(&item),
            Err(StoreError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_item_key_has_both_key_attributes() {
        let key = item_key(
            &UserId::from_string("u1".to_string()).unwrap(),
            &TodoId::from_string("t1".to_string()).unwrap(),
        );
        assert_eq!(key.len(), 2);
        assert_eq!(key.get("userId"), Some(&AttributeValue::S("u1".to_string())));
        assert_eq!(key.get("todoId"), Some(&AttributeValue::S("t1".to_string())));
    }
}
