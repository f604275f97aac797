use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::constants::{ROLE_ADMIN, SUPER_ADMIN_USERNAME};

/// Identity attached to a request by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// The seeded `admin` account
    pub fn is_super_admin(&self) -> bool {
        self.is_admin() && self.username == SUPER_ADMIN_USERNAME
    }

    /// Owners and admins may modify a resource
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

/// JWT claims issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(user_id: Uuid, username: String, role: String, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            username,
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}
