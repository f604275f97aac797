mod rate_limit_policy;

pub use rate_limit_policy::{RateLimitDecision, RateLimitPolicy, API_PREFIX, LOGIN_PREFIX};
