use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::password;
use crate::database::models::NewAdmin;
use crate::error::ApiError;
use crate::middleware::auth::CurrentAdmin;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Accepts either the username or the email address.
    pub username: String,
    pub password: String,
}

/// POST /auth/register - create an admin account and return a session token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_registration(&body)?;

    // The plaintext is hashed exactly once, here, before the store sees it.
    let password_hash = password::hash(&body.password, state.config.security.bcrypt_cost)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let admin = state
        .admins
        .create(NewAdmin {
            username: body.username,
            email: body.email,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(admin.id)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Admin registered successfully",
            "token": token,
            "admin": admin.to_public(),
        })),
    ))
}

/// POST /auth/login - verify credentials and return a session token.
///
/// Unknown identifier and wrong password produce the same response, and the
/// hash comparison runs in both cases so timing does not tell them apart.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let admin = match state.admins.find_by_username_or_email(&body.username).await? {
        Some(admin) => admin,
        None => {
            password::verify_dummy(&body.password);
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify(&body.password, &admin.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(admin.id)?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "admin": admin.to_public(),
    })))
}

/// GET /auth/me - identity behind the presented token.
pub async fn me(Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>) -> Json<Value> {
    Json(json!({
        "success": true,
        "admin": admin.to_public(),
    }))
}

fn validate_registration(body: &RegisterRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if let Err(msg) = validate_username(&body.username) {
        field_errors.insert("username".to_string(), msg);
    }
    if let Err(msg) = validate_email(&body.email) {
        field_errors.insert("email".to_string(), msg);
    }
    if body.password.len() < MIN_PASSWORD_LENGTH {
        field_errors.insert(
            "password".to_string(),
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(
            "Invalid registration data",
            Some(field_errors),
        ))
    }
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Username can only contain letters, numbers, underscore, and hyphen".to_string(),
        );
    }
    if !username.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_a_sane_registration() {
        assert!(validate_registration(&request("botanist", "b@example.com", "longenough")).is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let err = validate_registration(&request("botanist", "b@example.com", "short")).unwrap_err();
        assert!(err.to_json()["field_errors"].get("password").is_some());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has spaces").is_err());
        assert!(validate_username("_leading").is_err());
        assert!(validate_username("fine_name-1").is_ok());
    }

    #[test]
    fn rejects_bad_emails() {
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@nouser.com").is_err());
        assert!(validate_email("x@nodot").is_err());
        assert!(validate_email("a@b.co").is_ok());
    }

    #[test]
    fn collects_every_field_error_at_once() {
        let err = validate_registration(&request("a", "bad", "pw")).unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"].get("username").is_some());
        assert!(body["field_errors"].get("email").is_some());
        assert!(body["field_errors"].get("password").is_some());
    }
}
