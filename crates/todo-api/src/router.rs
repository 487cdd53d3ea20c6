use infrastructure::TodoStore;
use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};

use crate::auth::extract_user_id;
use crate::error::ApiError;
use crate::handlers;
use crate::responses;
use crate::service::TodoService;

/// Everything a request needs, built once per Lambda container.
pub struct AppState<S> {
    pub service: TodoService<S>,
    pub empty_list_is_error: bool,
}

impl<S: TodoStore> AppState<S> {
    pub fn new(service: TodoService<S>, empty_list_is_error: bool) -> Self {
        Self {
            service,
            empty_list_is_error,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Todos,
    Todo(&'a str),
    Attachment(&'a str),
    Unknown,
}

/// Matches on the segments after `todos`, so a stage prefix such as
/// `/dev/todos/...` routes the same way.
fn parse_route(path: &str) -> Route<'_> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(start) = segments.iter().position(|s| *s == "todos") else {
        return Route::Unknown;
    };

    match &segments[start + 1..] {
        [] => Route::Todos,
        [todo_id] => Route::Todo(*todo_id),
        [todo_id, "attachment"] => Route::Attachment(*todo_id),
        _ => Route::Unknown,
    }
}

pub async fn route<S: TodoStore>(
    req: Request,
    state: &AppState<S>,
) -> Result<Response<Body>, lambda_http::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    tracing::info!(path = %path, method = %method, "Incoming request");

    let response = match route_inner(&req, state, &path, &method).await {
        Ok(response) => response,
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(error = ?e, "Request failed");
            } else {
                tracing::warn!(error = %e, "Request rejected");
            }
            e.into_response()
        }
    };

    Ok(response)
}

async fn route_inner<S: TodoStore>(
    req: &Request,
    state: &AppState<S>,
    path: &str,
    method: &Method,
) -> Result<Response<Body>, ApiError> {
    if method == Method::OPTIONS {
        return Ok(responses::no_content());
    }

    let route = parse_route(path);
    if route == Route::Unknown {
        return Err(ApiError::RouteNotFound);
    }

    let user_id = extract_user_id(req)?;

    match (method, route) {
        (&Method::GET, Route::Todos) => handlers::list_todos(req, state, &user_id).await,
        (&Method::POST, Route::Todos) => handlers::create_todo(req, state, &user_id).await,
        (&Method::GET, Route::Todo(raw)) => {
            let todo_id = handlers::parse_todo_id(raw)?;
            handlers::get_todo(state, &user_id, &todo_id).await
        }
        (&Method::PATCH, Route::Todo(raw)) => {
            let todo_id = handlers::parse_todo_id(raw)?;
            handlers::update_todo(req, state, &user_id, &todo_id).await
        }
        (&Method::DELETE, Route::Todo(raw)) => {
            let todo_id = handlers::parse_todo_id(raw)?;
            handlers::delete_todo(state, &user_id, &todo_id).await
        }
        (&Method::POST, Route::Attachment(raw)) => {
            let todo_id = handlers::parse_todo_id(raw)?;
            handlers::add_attachment(state, &user_id, &todo_id).await
        }
        _ => Err(ApiError::RouteNotFound),
    }
}
