use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParameter(String),

    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("There is no todos found for this user")]
    EmptyResult,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

pub type TodoResult<T> = Result<T, TodoError>;
