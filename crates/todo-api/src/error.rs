use domain::TodoError;
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use shared::AuthError;
use thiserror::Error;

use crate::responses;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Route not found")]
    RouteNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQueryParameter(String),

    #[error("There is no todos found for this user")]
    EmptyResult,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The named todo does not exist for the caller.
    #[error("Cannot find todo with todoId: {0}")]
    TodoNotFound(String),

    /// The first field is shown to the client, the second is only logged.
    #[error("{0}")]
    Internal(String, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound | ApiError::TodoNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::InvalidQueryParameter(_) | ApiError::EmptyResult => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Replaces the client-facing message of an internal error.
    pub fn with_public_message(self, message: impl Into<String>) -> Self {
        match self {
            ApiError::Internal(_, detail) => ApiError::Internal(message.into(), detail),
            other => other,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let status = self.status();
        match self {
            // answered in plain text
            ApiError::EmptyResult | ApiError::TodoNotFound(_) | ApiError::Internal(..) => {
                responses::text(status, self.to_string())
            }
            other => responses::json(status, &serde_json::json!({ "error": other.to_string() })),
        }
    }
}

impl From<TodoError> for ApiError {
    fn from(e: TodoError) -> Self {
        match e {
            TodoError::InvalidQueryParameter(name) => ApiError::InvalidQueryParameter(name),
            TodoError::NotFound(todo_id) => ApiError::TodoNotFound(todo_id),
            TodoError::EmptyResult => ApiError::EmptyResult,
            TodoError::Unauthorized(message) => ApiError::Unauthorized(message),
            TodoError::Domain(e) => ApiError::BadRequest(e.to_string()),
            TodoError::StoreFailure(detail) => {
                ApiError::Internal("Internal server error".to_string(), detail)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    fn body_text(response: &Response<Body>) -> String {
        match response.body() {
            Body::Text(text) => text.clone(),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_store_failure_hides_detail() {
        let error = ApiError::from(TodoError::StoreFailure("table is on fire".to_string()));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(&response), "Internal server error");
    }

    #[test]
    fn test_public_message_only_applies_to_internal_errors() {
        let internal = ApiError::from(TodoError::StoreFailure("boom".to_string()))
            .with_public_message("Failed to delete todo with Id: t1");
        assert_eq!(internal.to_string(), "Failed to delete todo with Id: t1");

        let unauthorized =
            ApiError::Unauthorized("no token".to_string()).with_public_message("ignored");
        assert_eq!(unauthorized.to_string(), "Unauthorized: no token");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::from(TodoError::EmptyResult), StatusCode::BAD_REQUEST),
            (
                ApiError::from(TodoError::InvalidQueryParameter("limit".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TodoError::Domain(DomainError::Validation(
                    "name must not be empty".to_string(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TodoError::NotFound("t1".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::from(AuthError::MissingToken), StatusCode::UNAUTHORIZED),
            (ApiError::RouteNotFound, StatusCode::NOT_FOUND),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error}");
        }
    }

    #[test]
    fn test_empty_result_is_plain_text() {
        let response = ApiError::EmptyResult.into_response();
        assert_eq!(body_text(&response), "There is no todos found for this user");
    }

    #[test]
    fn test_invalid_parameter_is_json() {
        let response = ApiError::InvalidQueryParameter("limit".to_string()).into_response();
        let body: serde_json::Value = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(body["error"], "Invalid query parameter: limit");
    }
}
