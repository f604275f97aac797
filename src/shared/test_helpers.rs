use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{ROLE_EDITOR, ROLE_USER};

use axum::{extract::Request, middleware::Next, response::Response, Router};
use uuid::Uuid;

pub fn create_editor_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::from_u128(2),
        username: "editor".to_string(),
        role: ROLE_EDITOR.to_string(),
    }
}

pub fn create_plain_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::from_u128(3),
        username: "reader".to_string(),
        role: ROLE_USER.to_string(),
    }
}

/// Insert a fixed identity into every request, in place of the JWT middleware
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

pub fn with_editor_auth(router: Router) -> Router {
    with_auth(router, create_editor_user())
}

pub fn with_user_auth(router: Router) -> Router {
    with_auth(router, create_plain_user())
}
