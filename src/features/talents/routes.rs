use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::talents::handlers;
use crate::features::talents::services::TalentService;

/// Talents readable without a token
pub fn public_routes(service: Arc<TalentService>) -> Router {
    Router::new()
        .route("/api/talents", get(handlers::list_talents))
        .route("/api/talents/{id}", get(handlers::get_talent))
        .with_state(service)
}

/// Talent management routes (require JWT authentication)
pub fn protected_routes(service: Arc<TalentService>) -> Router {
    Router::new()
        .route("/api/talents", post(handlers::create_talent))
        .route(
            "/api/talents/{id}",
            put(handlers::update_talent).delete(handlers::delete_talent),
        )
        .route(
            "/api/talents/{id}/featured",
            patch(handlers::set_talent_featured),
        )
        .with_state(service)
}
