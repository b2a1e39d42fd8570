use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::database::models::Admin;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin context attached to guarded requests.
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub Admin);

/// Access guard for every mutating plant endpoint and the dashboard.
///
/// Extracts the bearer token, verifies signature and expiry, then resolves
/// the subject against the credential store — a token whose account has been
/// removed is as unauthenticated as no token at all. The resolved admin is
/// injected into request extensions for downstream handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let claims = state.tokens.verify(&token)?;

    let admin = state
        .admins
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Account no longer exists"))?;

    request.extensions_mut().insert(CurrentAdmin(admin));
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Invalid Authorization header"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Authorization header must use Bearer format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthenticated("Empty bearer token"));
    }

    Ok(token.to_string())
}
