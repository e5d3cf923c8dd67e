//! Development sign-in.
//!
//! Real sign-in happens at the identity provider. For local development and
//! end-to-end tests this route mints an identity token for any email, using
//! the configured private key. It is refused in production.

use axum::{
    extract::{Query, State},
    Json,
};
use persistence::repositories::ProfileRepository;
use serde::{Deserialize, Serialize};
use shared::crypto::sha256_hex;
use shared::validation::normalize_email;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct TestLoginQuery {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TestLoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user_id: Uuid,
}

/// Mint an identity token for an email.
///
/// GET /api/v1/auth/test-login?email=
///
/// A returning email keeps its user id.
pub async fn test_login(
    State(state): State<AppState>,
    Query(query): Query<TestLoginQuery>,
) -> Result<Json<TestLoginResponse>, ApiError> {
    if state.config.is_production() || !state.config.security.test_login_enabled {
        return Err(ApiError::Forbidden("Test login is disabled".to_string()));
    }

    let jwt = state
        .jwt
        .as_deref()
        .filter(|jwt| jwt.can_sign())
        .ok_or_else(|| ApiError::Forbidden("Test login is not configured".to_string()))?;

    query.validate()?;
    let email = normalize_email(&query.email);

    let user_id = ProfileRepository::new(state.pool.clone())
        .find_by_email(&email)
        .await?
        .map(|profile| profile.id)
        .unwrap_or_else(Uuid::new_v4);

    let (access_token, _jti) = jwt
        .generate_token(user_id, &email, query.name.as_deref())
        .map_err(|e| ApiError::Internal(format!("Failed to mint token: {}", e)))?;

    info!(
        user_id = %user_id,
        email_hash = %&sha256_hex(&email)[..12],
        "Test login token issued"
    );

    Ok(Json(TestLoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: jwt.token_expiry_secs,
        user_id,
    }))
}
