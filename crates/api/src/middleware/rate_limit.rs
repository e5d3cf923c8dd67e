//! Rate limiting middleware for guest routes.
//!
//! Guest routes are unauthenticated apart from the magic token, so each
//! client address gets its own quota to slow down token guessing.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{clock::Clock, clock::DefaultClock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::{net::SocketAddr, num::NonZeroU32};

use crate::app::AppState;

/// Tracked clients above which idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Per-client rate limiter shared across all guest requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter allowing `rate_limit_per_minute` requests
    /// per client. Zero falls back to 60.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        let per_minute =
            NonZeroU32::new(rate_limit_per_minute).unwrap_or(NonZeroU32::MIN.saturating_add(59));
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            rate_limit_per_minute,
        }
    }

    pub fn limit(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Check if a request from `client` should be allowed.
    /// Returns Err with retry-after seconds (at least 1) if limited.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        self.limiter.check_key(&client.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            wait.as_secs().max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Client key: the socket peer, or the first `X-Forwarded-For` hop when the
/// service runs behind a proxy and no peer address is known.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (peer, forwarded) {
        (Some(addr), _) if !addr.ip().is_loopback() => addr.ip().to_string(),
        (_, Some(hop)) => hop.to_string(),
        (Some(addr), None) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Middleware that applies per-client rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer);

    if let Err(retry_after) = rate_limiter.check(&client) {
        tracing::warn!(path = %req.uri().path(), "Guest rate limit exceeded");
        return rate_limited_response(rate_limiter.limit(), retry_after);
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retry_after": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
