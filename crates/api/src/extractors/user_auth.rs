//! Host identity extractor.
//!
//! Hosts sign in with the external identity provider, which issues a signed
//! token. This extractor verifies the Bearer token against the provider's
//! public key and exposes the caller's id, email and display name.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use shared::jwt::{extract_user_id, Claims, JwtConfig};
use shared::validation::normalize_email;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated host.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the token subject claim.
    pub user_id: Uuid,
    /// Verified email, lower-cased.
    pub email: String,
    pub name: Option<String>,
}

impl UserAuth {
    /// Validates a token and returns the caller's identity.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Identity token rejected");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;
        Self::from_claims(&claims)
    }

    fn from_claims(claims: &Claims) -> Result<Self, ApiError> {
        let user_id = extract_user_id(claims)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        let email = normalize_email(&claims.email);
        if email.is_empty() {
            return Err(ApiError::Unauthorized("Token has no email".to_string()));
        }

        Ok(Self {
            user_id,
            email,
            name: claims
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }

        let token = bearer_token(parts)?;

        let jwt = state.jwt.as_deref().ok_or_else(|| {
            ApiError::Internal("Identity token verification is not configured".to_string())
        })?;

        let auth = Self::validate(jwt, token)?;
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}
