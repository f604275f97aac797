use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

/// User management routes (require JWT authentication)
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/api/users/{id}/toggle-status",
            patch(handlers::toggle_user_status),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{with_editor_auth, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    /// Guards reject before the service touches the database
    fn server(router: Router) -> TestServer {
        TestServer::new(router).unwrap()
    }

    fn lazy_service() -> Arc<UserService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        Arc::new(UserService::new(pool))
    }

    #[tokio::test]
    async fn test_non_admin_cannot_create_or_toggle_users() {
        let server = server(with_editor_auth(routes(lazy_service())));

        let response = server
            .post("/api/users")
            .json(&serde_json::json!({
                "username": "new_user",
                "email": "new@example.com",
                "password": "secret1"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let id = uuid::Uuid::new_v4();
        let response = server
            .patch(&format!("/api/users/{}/toggle-status", id))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_only_super_admin_deletes_users() {
        let server = server(with_editor_auth(routes(lazy_service())));
        let response = server
            .delete(&format!("/api/users/{}", uuid::Uuid::new_v4()))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_users_cannot_modify_other_accounts() {
        let server = server(with_user_auth(routes(lazy_service())));
        let response = server
            .put(&format!("/api/users/{}", uuid::Uuid::new_v4()))
            .json(&serde_json::json!({ "username": "renamed" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = server(routes(lazy_service()));
        let response = server.get("/api/users").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
