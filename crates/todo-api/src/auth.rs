use domain::UserId;
use lambda_http::http::header::AUTHORIZATION;
use lambda_http::request::RequestContext;
use lambda_http::{Request, RequestExt};
use shared::{user_id_from_authorization, AuthError};

use crate::error::ApiError;

/// The caller is the `sub` claim. HTTP API JWT authorizers hand the verified
/// claims over in the request context; otherwise the bearer token is read.
pub fn extract_user_id(req: &Request) -> Result<UserId, ApiError> {
    if let Some(RequestContext::ApiGatewayV2(ctx)) = req.request_context_ref() {
        if let Some(jwt) = ctx.authorizer.as_ref().and_then(|a| a.jwt.as_ref()) {
            let sub = jwt
                .claims
                .get("sub")
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized("Missing sub claim".to_string()))?;
            return UserId::from_string(sub).map_err(|e| ApiError::Unauthorized(e.to_string()));
        }
    }

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    Ok(user_id_from_authorization(header)?)
}
