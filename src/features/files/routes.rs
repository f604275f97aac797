use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{delete_file, list_files, upload_file};
use crate::features::files::services::FileService;

/// Create routes for the files feature (require JWT authentication)
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            get(list_files)
                .post(upload_file)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/upload/{file_id}", delete(delete_file))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::LocalStorage;
    use crate::shared::test_helpers::with_editor_auth;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    /// Upload validation rejects before the service touches the database
    fn lazy_service() -> Arc<FileService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let storage = LocalStorage::new(std::env::temp_dir(), "http://localhost:5001");
        Arc::new(FileService::new(pool, Arc::new(storage)))
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_mime_type() {
        let server = TestServer::new(with_editor_auth(routes(lazy_service()))).unwrap();

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"MZ\x90\x00".to_vec())
                .file_name("setup.exe")
                .mime_type("application/x-msdownload"),
        );
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_upload_requires_file_part() {
        let server = TestServer::new(with_editor_auth(routes(lazy_service()))).unwrap();

        let form = MultipartForm::new().add_text("sourceType", "news_cover");
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_source_type() {
        let server = TestServer::new(with_editor_auth(routes(lazy_service()))).unwrap();

        let form = MultipartForm::new()
            .add_text("sourceType", "banner")
            .add_part(
                "file",
                Part::bytes(b"png".to_vec())
                    .file_name("a.png")
                    .mime_type("image/png"),
            );
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_requires_authentication() {
        let server = TestServer::new(routes(lazy_service())).unwrap();

        let response = server.get("/api/upload").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
