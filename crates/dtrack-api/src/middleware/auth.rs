//! Bearer-token authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use dtrack_domain::entities::User;

use crate::{error::ApiError, state::AppState};

/// The authenticated user, inserted as a request extension by
/// [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Reject the request unless it carries a valid bearer token; on
/// success the resolved user rides along as [`CurrentUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Authentication("missing bearer token".to_string()))?;

    let user = state
        .auth
        .authenticate(&token)
        .await
        .map_err(|_| ApiError::Authentication("invalid or expired token".to_string()))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
