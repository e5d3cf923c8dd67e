use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::HostPermissionPolicy;
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{auth, dishes, events, groups, guest_portal, guests, health, me};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub hosts: Arc<HostPermissionPolicy>,
    /// `None` when the configured keys could not be parsed; host routes then
    /// answer 500 instead of the process refusing to start.
    pub jwt: Option<Arc<JwtConfig>>,
}

impl AppState {
    /// Rejects hosts that are not allowed to create or edit dishes, events
    /// and guest lists.
    pub fn ensure_can_mutate(&self, auth: &UserAuth) -> Result<(), ApiError> {
        if self.hosts.can_mutate(&auth.email) {
            Ok(())
        } else {
            warn!(user_id = %auth.user_id, "Host mutation denied by allow-list");
            Err(ApiError::Forbidden(
                "You are not allowed to make changes".to_string(),
            ))
        }
    }

    /// Base URL for guest links.
    pub fn public_base_url(&self) -> &str {
        self.config.public_base_url()
    }
}

fn build_jwt_config(config: &Config) -> Option<Arc<JwtConfig>> {
    let jwt = &config.jwt;
    let result = if jwt.private_key.trim().is_empty() {
        JwtConfig::verifier(&jwt.public_key, jwt.leeway_secs)
    } else {
        JwtConfig::with_signing_key(
            &jwt.private_key,
            &jwt.public_key,
            jwt.token_expiry_secs,
            jwt.leeway_secs,
        )
    };

    match result {
        Ok(jwt) => Some(Arc::new(jwt)),
        Err(e) => {
            warn!(error = %e, "Identity token keys are invalid; host routes will fail");
            None
        }
    }
}

fn build_cors(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let rate_limiter = (config.security.guest_rate_limit_per_minute > 0).then(|| {
        Arc::new(RateLimiterState::new(
            config.security.guest_rate_limit_per_minute,
        ))
    });

    let hosts = HostPermissionPolicy::new(
        &config.hosts.allowed_emails,
        config.hosts.allow_all_hosts,
    );
    if hosts.is_bypassed() {
        warn!("Host allow-list bypass is enabled; every signed-in user may edit");
    } else {
        info!(allowed_hosts = hosts.allowed_count(), "Host allow-list loaded");
    }

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
        hosts: Arc::new(hosts),
        jwt: build_jwt_config(&config),
    };

    // Guest routes: magic-token gated, rate limited per client
    let guest_routes = Router::new()
        .route(
            "/api/v1/guest/events/:event_id",
            get(guest_portal::get_guest_menu),
        )
        .route(
            "/api/v1/guest/events/:event_id/selection",
            post(guest_portal::submit_selection),
        )
        .route(
            "/api/v1/guest/events/:event_id/feedback",
            get(guest_portal::get_guest_feedback).post(guest_portal::submit_feedback),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Host routes: identity token required (checked by the UserAuth extractor)
    let host_routes = Router::new()
        .route("/api/v1/me", get(me::get_me))
        .route("/api/v1/dashboard", get(me::get_dashboard))
        .route(
            "/api/v1/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/api/v1/groups/:group_id",
            get(groups::get_group).delete(groups::delete_group),
        )
        .route(
            "/api/v1/groups/:group_id/members",
            post(groups::add_member),
        )
        .route(
            "/api/v1/groups/:group_id/members/:user_id",
            put(groups::update_member_role).delete(groups::remove_member),
        )
        .route(
            "/api/v1/groups/:group_id/dishes/import",
            post(dishes::import_dishes),
        )
        .route("/api/v1/dishes", post(dishes::create_dish))
        .route(
            "/api/v1/dishes/:dish_id",
            get(dishes::get_dish)
                .put(dishes::update_dish)
                .delete(dishes::delete_dish),
        )
        .route("/api/v1/events", post(events::create_event))
        .route("/api/v1/events/:event_id", get(events::get_event))
        .route(
            "/api/v1/events/:event_id/status",
            put(events::update_event_status),
        )
        .route(
            "/api/v1/events/:event_id/summary",
            get(events::get_event_summary),
        )
        .route(
            "/api/v1/events/:event_id/feedback",
            get(events::get_event_feedback),
        )
        .route(
            "/api/v1/events/:event_id/guests",
            get(guests::list_guests).post(guests::invite_guest),
        )
        .route(
            "/api/v1/events/:event_id/guests/:guest_id",
            delete(guests::remove_guest),
        )
        .route(
            "/api/v1/events/:event_id/guests/:guest_id/links",
            get(guests::get_guest_links),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/v1/auth/test-login", get(auth::test_login))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(guest_routes)
        .merge(host_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        // Path only: guest URLs carry the magic token in the query string
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::debug_span!("http", method = %req.method(), path = %req.uri().path())
            }),
        )
        .layer(middleware::from_fn(trace_id))
        .layer(build_cors(&config))
        .with_state(state)
}
