use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::AppError;
use crate::core::middleware::client_identity;
use crate::features::rate_limits::models::RateLimitDecision;
use crate::features::rate_limits::services::RateLimiter;
use crate::shared::types::ApiResponse;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Count the request against the limiter's policy and reject it with 429 once the
/// client is over the limit.
///
/// When limiters are nested, the innermost one's `RateLimit-*` headers are kept.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = client_identity(&req, limiter.trust_proxy());

    match limiter.check(&identity).await? {
        RateLimitDecision::Bypassed => Ok(next.run(req).await),
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset,
        } => {
            let mut response = next.run(req).await;
            set_rate_limit_headers(response.headers_mut(), limit, remaining, reset);
            Ok(response)
        }
        RateLimitDecision::Limited { limit, reset } => {
            tracing::info!(
                policy = limiter.policy().name,
                identity = %identity,
                "Request throttled"
            );
            let body = ApiResponse::<()>::error(Some(limiter.policy().message.clone()), None);
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let headers = response.headers_mut();
            set_rate_limit_headers(headers, limit, 0, reset);
            headers.insert(
                axum::http::header::RETRY_AFTER,
                HeaderValue::from(reset_seconds(reset)),
            );
            Ok(response)
        }
    }
}

fn set_rate_limit_headers(headers: &mut HeaderMap, limit: u64, remaining: u64, reset: Duration) {
    if headers.contains_key(RATE_LIMIT_LIMIT) {
        return;
    }
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_seconds(reset)));
}

/// Whole seconds, rounded up
fn reset_seconds(reset: Duration) -> u64 {
    let secs = reset.as_secs();
    if reset.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FailureMode;
    use crate::features::rate_limits::models::{RateLimitPolicy, API_PREFIX, LOGIN_PREFIX};
    use crate::features::rate_limits::services::rate_limiter::tests::{policy, FailingStore};
    use crate::modules::counter_store::{CounterStore, MemoryCounterStore};
    use axum::{
        middleware::from_fn_with_state,
        routing::{get, post},
        Router,
    };
    use axum_test::TestServer;

    const CLIENT: &str = "203.0.113.7";

    fn limiter(policy: RateLimitPolicy, store: Arc<dyn CounterStore>) -> Arc<RateLimiter> {
        Arc::new(
            RateLimiter::new(
                policy,
                store,
                vec!["127.0.0.1".to_string(), "::1".to_string()],
                FailureMode::Open,
            )
            .with_trust_proxy(true),
        )
    }

    async fn always_unauthorized() -> AppError {
        AppError::Unauthorized("Invalid email or password".to_string())
    }

    async fn ok() -> &'static str {
        "ok"
    }

    /// `/api` guarded by the general policy, login additionally by the login policy
    fn app(api_max: u64, login_max: u64) -> TestServer {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryCounterStore::new());
        let api = limiter(
            RateLimitPolicy {
                prefix: API_PREFIX,
                ..policy(api_max)
            },
            Arc::clone(&store),
        );
        let login = limiter(
            RateLimitPolicy {
                prefix: LOGIN_PREFIX,
                message: "Too many login attempts".to_string(),
                ..policy(login_max)
            },
            store,
        );

        let login_route = Router::new()
            .route("/api/auth/login", post(always_unauthorized))
            .route_layer(from_fn_with_state(login, rate_limit_middleware));

        let router = Router::new()
            .route("/api/news", get(ok))
            .merge(login_route)
            .layer(from_fn_with_state(api, rate_limit_middleware));

        TestServer::new(router).unwrap()
    }

    fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static(ip),
        )
    }

    #[tokio::test]
    async fn test_sixth_login_attempt_is_throttled() {
        let server = app(30, 5);
        let (name, value) = forwarded_for(CLIENT);

        for _ in 0..5 {
            let response = server
                .post("/api/auth/login")
                .add_header(name.clone(), value.clone())
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }

        let response = server
            .post("/api/auth/login")
            .add_header(name, value)
            .await;
        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Too many login attempts");
        assert!(response.headers().contains_key("retry-after"));
    }

    #[tokio::test]
    async fn test_general_limit_applies_beyond_max() {
        let server = app(3, 5);
        let (name, value) = forwarded_for(CLIENT);

        for remaining in (0..3).rev() {
            let response = server
                .get("/api/news")
                .add_header(name.clone(), value.clone())
                .await;
            assert_eq!(response.status_code(), StatusCode::OK);
            assert_eq!(
                response.headers()["ratelimit-remaining"],
                remaining.to_string().as_str()
            );
        }

        let response = server.get("/api/news").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["ratelimit-limit"], "3");

        // A different client is unaffected
        let (name, value) = forwarded_for("198.51.100.1");
        let response = server.get("/api/news").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_whitelisted_client_is_never_throttled() {
        let server = app(30, 5);
        let (name, value) = forwarded_for("127.0.0.1");

        for _ in 0..1000 {
            let response = server
                .get("/api/news")
                .add_header(name.clone(), value.clone())
                .await;
            assert_ne!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        }
    }

    #[tokio::test]
    async fn test_store_outage_fail_open_and_closed() {
        let open = Arc::new(
            RateLimiter::new(policy(1), Arc::new(FailingStore), Vec::new(), FailureMode::Open)
                .with_trust_proxy(true),
        );
        let server = TestServer::new(
            Router::new()
                .route("/api/news", get(ok))
                .layer(from_fn_with_state(open, rate_limit_middleware)),
        )
        .unwrap();
        let (name, value) = forwarded_for(CLIENT);
        let response = server
            .get("/api/news")
            .add_header(name.clone(), value.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let closed = Arc::new(
            RateLimiter::new(policy(1), Arc::new(FailingStore), Vec::new(), FailureMode::Closed)
                .with_trust_proxy(true),
        );
        let server = TestServer::new(
            Router::new()
                .route("/api/news", get(ok))
                .layer(from_fn_with_state(closed, rate_limit_middleware)),
        )
        .unwrap();
        let response = server.get("/api/news").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_reset_seconds_rounds_up() {
        assert_eq!(reset_seconds(Duration::from_millis(59_001)), 60);
        assert_eq!(reset_seconds(Duration::from_secs(60)), 60);
        assert_eq!(reset_seconds(Duration::ZERO), 0);
    }
}
