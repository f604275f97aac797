//! Per-client request throttling.
//!
//! Every `/api` request is counted under the general policy; login attempts are
//! additionally counted under the login policy. Counters live in the shared
//! counter store so limits hold across instances.

pub mod middleware;
pub mod models;
pub mod services;

pub use middleware::rate_limit_middleware;
pub use models::RateLimitPolicy;
pub use services::RateLimiter;
