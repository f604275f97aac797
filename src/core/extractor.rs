use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body extractor whose rejections use the `ApiResponse` error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(json_rejection_message(rejection)))
    }
}

fn json_rejection_message(rejection: JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        _ => "Failed to parse JSON body".to_string(),
    }
}

/// Query string extractor for list filters.
///
/// Unknown enum values such as `status=archived` become a 400 envelope instead
/// of axum's plain-text rejection.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| {
                AppError::BadRequest(format!("Invalid query parameters: {}", rejection.body_text()))
            })
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Filter {
        page: Option<u32>,
    }

    async fn echo_page(AppQuery(filter): AppQuery<Filter>) -> String {
        filter.page.unwrap_or(1).to_string()
    }

    #[tokio::test]
    async fn test_query_rejection_uses_error_envelope() {
        let server = TestServer::new(Router::new().route("/", get(echo_page))).unwrap();

        let ok = server.get("/?page=3").await;
        ok.assert_status_ok();
        ok.assert_text("3");

        let bad = server.get("/?page=three").await;
        bad.assert_status_bad_request();
        let body: serde_json::Value = bad.json();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        async fn whoami(user: AuthenticatedUser) -> String {
            user.username
        }
        let server = TestServer::new(Router::new().route("/", get(whoami))).unwrap();

        server.get("/").await.assert_status_unauthorized();
    }
}
