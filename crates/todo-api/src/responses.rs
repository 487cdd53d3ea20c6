use lambda_http::http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use serde::Serialize;

const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET,POST,PATCH,DELETE,OPTIONS"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type,Authorization"),
];

fn build(status: StatusCode, content_type: Option<&'static str>, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    add_cors_headers(&mut response);
    response
}

fn add_cors_headers(response: &mut Response<Body>) {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

pub fn json(status: StatusCode, body: &impl Serialize) -> Response<Body> {
    match serde_json::to_string(body) {
        Ok(json) => build(status, Some("application/json"), Body::from(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn text(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    build(status, Some("text/plain"), Body::from(message.into()))
}

pub fn no_content() -> Response<Body> {
    build(StatusCode::NO_CONTENT, None, Body::Empty)
}
