use std::time::Duration;

use crate::core::config::RateLimitConfig;

/// Counter key prefix for the general API policy
pub const API_PREFIX: &str = "rate-limit-api:";
/// Counter key prefix for the login policy
pub const LOGIN_PREFIX: &str = "rate-limit-login:";

/// How many requests an identity may make per window
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub prefix: &'static str,
    pub max: u64,
    pub window: Duration,
    /// Returned in the 429 body
    pub message: String,
}

impl RateLimitPolicy {
    /// Applied to every `/api` request
    pub fn api(config: &RateLimitConfig) -> Self {
        Self {
            name: "api",
            prefix: API_PREFIX,
            max: config.api_max,
            window: config.api_window,
            message: config.api_message.clone(),
        }
    }

    /// Applied to `/api/auth/login` on top of the general policy
    pub fn login(config: &RateLimitConfig) -> Self {
        Self {
            name: "login",
            prefix: LOGIN_PREFIX,
            max: config.login_max,
            window: config.login_window,
            message: config.login_message.clone(),
        }
    }

    pub fn key(&self, identity: &str) -> String {
        format!("{}{}", self.prefix, identity)
    }
}

/// Outcome of checking one request against a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u64,
        remaining: u64,
        reset: Duration,
    },
    Limited {
        limit: u64,
        reset: Duration,
    },
    /// Not counted: whitelisted identity, or store outage with fail-open
    Bypassed,
}
