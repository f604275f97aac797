//! Features layer - one module per API resource
//!
//! Each feature follows the same layout: `models` (database rows), `dtos`
//! (request/response bodies), `services` (business logic), `handlers` (axum
//! handlers) and `routes`.

pub mod auth;
pub mod categories;
pub mod employment;
pub mod files;
pub mod news;
pub mod rate_limits;
pub mod talents;
pub mod users;
