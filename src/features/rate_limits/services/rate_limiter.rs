use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::config::{FailureMode, RateLimitConfig};
use crate::core::error::{AppError, Result};
use crate::features::rate_limits::models::{RateLimitDecision, RateLimitPolicy};
use crate::modules::counter_store::CounterStore;

/// Applies one policy against the shared counter store
pub struct RateLimiter {
    policy: RateLimitPolicy,
    store: Arc<dyn CounterStore>,
    whitelist: HashSet<String>,
    failure_mode: FailureMode,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(
        policy: RateLimitPolicy,
        store: Arc<dyn CounterStore>,
        whitelist: impl IntoIterator<Item = String>,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            policy,
            store,
            whitelist: whitelist.into_iter().collect(),
            failure_mode,
            trust_proxy: false,
        }
    }

    pub fn from_config(
        policy: RateLimitPolicy,
        store: Arc<dyn CounterStore>,
        config: &RateLimitConfig,
    ) -> Self {
        Self::new(
            policy,
            store,
            config.whitelist.iter().cloned(),
            config.failure_mode,
        )
        .with_trust_proxy(config.trust_proxy)
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn trust_proxy(&self) -> bool {
        self.trust_proxy
    }

    pub fn is_whitelisted(&self, identity: &str) -> bool {
        self.whitelist.contains(identity)
    }

    /// Count one request for `identity`.
    ///
    /// Whitelisted identities never touch the store. A store failure either lets the
    /// request through or fails with 503, depending on the failure mode.
    pub async fn check(&self, identity: &str) -> Result<RateLimitDecision> {
        if self.is_whitelisted(identity) {
            return Ok(RateLimitDecision::Bypassed);
        }

        let key = self.policy.key(identity);
        let snapshot = match self.store.increment(&key, self.policy.window).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return match self.failure_mode {
                    FailureMode::Open => {
                        warn!(
                            policy = self.policy.name,
                            "Counter store failed, allowing request: {}", e
                        );
                        Ok(RateLimitDecision::Bypassed)
                    }
                    FailureMode::Closed => {
                        warn!(
                            policy = self.policy.name,
                            "Counter store failed, rejecting request: {}", e
                        );
                        Err(AppError::ServiceUnavailable(
                            "Rate limiting is temporarily unavailable".to_string(),
                        ))
                    }
                };
            }
        };

        if snapshot.count > self.policy.max {
            debug!(
                policy = self.policy.name,
                identity, count = snapshot.count, "Rate limit exceeded"
            );
            return Ok(RateLimitDecision::Limited {
                limit: self.policy.max,
                reset: snapshot.resets_in,
            });
        }

        Ok(RateLimitDecision::Allowed {
            limit: self.policy.max,
            remaining: self.policy.max - snapshot.count,
            reset: snapshot.resets_in,
        })
    }
}
