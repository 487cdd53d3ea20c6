use domain::{CreateTodoRequest, TodoError, TodoId, UpdateTodoRequest, UserId};
use infrastructure::TodoStore;
use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::responses;
use crate::router::AppState;

fn read_json<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    let body_str = match req.body() {
        Body::Text(s) => s.as_str(),
        Body::Binary(b) => std::str::from_utf8(b)
            .map_err(|_| ApiError::BadRequest("Invalid UTF-8".to_string()))?,
        Body::Empty => return Err(ApiError::BadRequest("Empty body".to_string())),
    };

    Ok(serde_json::from_str(body_str)?)
}

fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, TodoError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| TodoError::InvalidQueryParameter("limit".to_string())),
        None => Ok(None),
    }
}

pub fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    Ok(TodoId::from_string(raw.to_string()).map_err(TodoError::from)?)
}

#[instrument(skip(req, state), fields(user_id = %user_id))]
pub async fn list_todos<S: TodoStore>(
    req: &Request,
    state: &AppState<S>,
    user_id: &UserId,
) -> Result<Response<Body>, ApiError> {
    let params = req.query_string_parameters_ref();
    let limit = parse_limit(params.and_then(|p| p.first("limit")))?;
    let next_key = params.and_then(|p| p.first("nextKey"));

    let list = state.service.list(user_id, limit, next_key).await?;
    info!(
        count = list.items.len(),
        has_more = list.next_key.is_some(),
        "Listed todos"
    );

    if list.items.is_empty() && state.empty_list_is_error {
        return Err(TodoError::EmptyResult.into());
    }

    Ok(responses::json(StatusCode::OK, &list))
}

#[instrument(skip(req, state), fields(user_id = %user_id))]
pub async fn create_todo<S: TodoStore>(
    req: &Request,
    state: &AppState<S>,
    user_id: &UserId,
) -> Result<Response<Body>, ApiError> {
    let input: CreateTodoRequest = read_json(req)?;
    let item = state.service.create(user_id, input).await?;

    Ok(responses::json(StatusCode::CREATED, &json!({ "item": item })))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_todo<S: TodoStore>(
    state: &AppState<S>,
    user_id: &UserId,
    todo_id: &TodoId,
) -> Result<Response<Body>, ApiError> {
    match state.service.get(user_id, todo_id).await? {
        Some(item) => Ok(responses::json(StatusCode::OK, &json!({ "item": item }))),
        None => Err(TodoError::NotFound(todo_id.to_string()).into()),
    }
}

#[instrument(skip(req, state), fields(user_id = %user_id))]
pub async fn update_todo<S: TodoStore>(
    req: &Request,
    state: &AppState<S>,
    user_id: &UserId,
    todo_id: &TodoId,
) -> Result<Response<Body>, ApiError> {
    let input: UpdateTodoRequest = read_json(req)?;
    state.service.update(user_id, todo_id, &input).await?;

    Ok(responses::no_content())
}

/// Checks for the item before deleting it. Another request may delete the
/// same item between the check and the delete; both then answer 200.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn delete_todo<S: TodoStore>(
    state: &AppState<S>,
    user_id: &UserId,
    todo_id: &TodoId,
) -> Result<Response<Body>, ApiError> {
    if !state.service.exists(user_id, todo_id).await? {
        return Err(TodoError::NotFound(todo_id.to_string()).into());
    }

    state
        .service
        .delete(user_id, todo_id)
        .await
        .map_err(|e| {
            ApiError::from(e).with_public_message(format!("Failed to delete todo with Id: {todo_id}"))
        })?;

    Ok(responses::text(
        StatusCode::OK,
        format!("Successfully deleted todo with Id: {todo_id}"),
    ))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn add_attachment<S: TodoStore>(
    state: &AppState<S>,
    user_id: &UserId,
    todo_id: &TodoId,
) -> Result<Response<Body>, ApiError> {
    let url = state.service.add_attachment(user_id, todo_id).await?;

    Ok(responses::json(
        StatusCode::OK,
        &json!({ "attachmentUrl": url }),
    ))
}
