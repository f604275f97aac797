use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Category routes readable without a token
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories/all", get(handlers::list_all_categories))
        .with_state(service)
}

/// Category management routes (require JWT authentication)
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .with_state(service)
}
