use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use crate::features::rate_limits::{rate_limit_middleware, RateLimiter};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required).
///
/// Login carries its own limiter on top of the general API limiter.
pub fn public_routes(service: Arc<AuthService>, login_limiter: Arc<RateLimiter>) -> Router {
    let login = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route_layer(from_fn_with_state(login_limiter, rate_limit_middleware))
        .with_state(Arc::clone(&service));

    Router::new()
        .route("/api/auth/dev-credentials", get(handlers::dev_credentials))
        .with_state(service)
        .merge(login)
}

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::get_me))
        .route("/api/auth/update-profile", put(handlers::update_profile))
        .with_state(service)
}
