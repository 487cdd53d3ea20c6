use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{TodoId, TodoItem, UpdateTodoRequest, UserId};
use tracing::{debug, info, instrument};

use crate::models::{attributes, item_key, item_to_todo, todo_to_item};
use crate::pagination::ResumePosition;
use crate::store::{StoreError, TodoPage, TodoStore};
use crate::DynamoDbClient;

/// [`TodoStore`] over the todos table. Listing goes through the index keyed
/// by `userId` and sorted by `dueDate`.
pub struct DynamoTodoStore {
    db: DynamoDbClient,
}

impl DynamoTodoStore {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }
}

fn store_error<E: std::error::Error>(e: E) -> StoreError {
    StoreError::DynamoDb(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl TodoStore for DynamoTodoStore {
    #[instrument(skip(self, start))]
    async fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<i32>,
        start: Option<ResumePosition>,
    ) -> Result<TodoPage, StoreError> {
        let output = self
            .db
            .client()
            .query()
            .table_name(self.db.table_name())
            .index_name(self.db.index_name())
            .key_condition_expression("userId = :userId")
            .expression_attribute_values(
                ":userId",
                AttributeValue::S(user_id.as_str().to_string()),
            )
            .set_limit(limit)
            .set_exclusive_start_key(start.map(|position| position.to_attribute_map()))
            .scan_index_forward(true)
            .send()
            .await
            .map_err(store_error)?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_todo)
            .collect::<Result<Vec<_>, _>>()?;

        let last_position = output
            .last_evaluated_key
            .as_ref()
            .map(ResumePosition::from_attribute_map)
            .transpose()
            .map_err(|e| StoreError::MalformedItem(e.to_string()))?;

        debug!(
            user_id = %user_id,
            count = items.len(),
            has_more = last_position.is_some(),
            "Queried todos"
        );

        Ok(TodoPage {
            items,
            last_position,
        })
    }

    #[instrument(skip(self, item), fields(user_id = %item.user_id, todo_id = %item.todo_id))]
    async fn create(&self, item: TodoItem) -> Result<TodoItem, StoreError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(&item)))
            .send()
            .await
            .map_err(store_error)?;

        info!("Todo saved");
        Ok(item)
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        fields: &UpdateTodoRequest,
    ) -> Result<(), StoreError> {
        self.db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(item_key(user_id, todo_id)))
            .update_expression("SET #name = :name, dueDate = :dueDate, done = :done")
            .expression_attribute_names("#name", attributes::NAME)
            .expression_attribute_values(":name", AttributeValue::S(fields.name.clone()))
            .expression_attribute_values(
                ":dueDate",
                AttributeValue::S(fields.due_date.clone()),
            )
            .expression_attribute_values(":done", AttributeValue::Bool(fields.done))
            .send()
            .await
            .map_err(store_error)?;

        info!("Todo updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError> {
        self.db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .set_key(Some(item_key(user_id, todo_id)))
            .send()
            .await
            .map_err(store_error)?;

        info!("Todo deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, StoreError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .set_key(Some(item_key(user_id, todo_id)))
            .send()
            .await
            .map_err(store_error)?;

        output.item.as_ref().map(item_to_todo).transpose()
    }

    #[instrument(skip(self))]
    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<(), StoreError> {
        self.db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(item_key(user_id, todo_id)))
            .update_expression("SET attachmentUrl = :attachmentUrl")
            .expression_attribute_values(":attachmentUrl", AttributeValue::S(url.to_string()))
            .send()
            .await
            .map_err(store_error)?;

        info!("Attachment URL set");
        Ok(())
    }
}
