use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::employment::handlers;
use crate::features::employment::services::EmploymentService;

/// Employment articles readable without a token
pub fn public_routes(service: Arc<EmploymentService>) -> Router {
    Router::new()
        .route("/api/employment", get(handlers::list_employment))
        .route("/api/employment/all", get(handlers::list_all_employment))
        .route("/api/employment/{id}", get(handlers::get_employment))
        .with_state(service)
}

/// Employment authoring routes (require JWT authentication)
pub fn protected_routes(service: Arc<EmploymentService>) -> Router {
    Router::new()
        .route("/api/employment", post(handlers::create_employment))
        .route(
            "/api/employment/{id}",
            put(handlers::update_employment).delete(handlers::delete_employment),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::FileService;
    use crate::modules::storage::LocalStorage;
    use crate::shared::test_helpers::with_user_auth;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_service() -> Arc<EmploymentService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let storage = Arc::new(LocalStorage::new(std::env::temp_dir(), "http://localhost:5001"));
        let files = Arc::new(FileService::new(pool.clone(), storage));
        Arc::new(EmploymentService::new(pool, files))
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let server = TestServer::new(with_user_auth(protected_routes(lazy_service()))).unwrap();

        let response = server
            .post("/api/employment")
            .json(&serde_json::json!({
                "title": "Job fair",
                "content": "<p>x</p>",
                "source": "City bureau",
                "category": "gossip",
                "tag": "job"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_tag_filter() {
        let server = TestServer::new(public_routes(lazy_service())).unwrap();

        let response = server.get("/api/employment/all?tag=celebrity").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
