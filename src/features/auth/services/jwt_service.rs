use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use crate::features::auth::model::{AuthenticatedUser, TokenClaims};

/// Issues and verifies HS256 access tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let secret = config.jwt_secret.as_bytes();
        let expires_in = parse_duration(&config.jwt_expires_in).ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid JWT_EXPIRES_IN value '{}'",
                config.jwt_expires_in
            ))
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            expires_in,
        })
    }

    pub fn issue(&self, user_id: Uuid, username: &str, role: &str) -> Result<String, AppError> {
        let claims = TokenClaims::new(
            user_id,
            username.to_string(),
            role.to_string(),
            self.expires_in,
        );
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::Unauthorized("Token is not valid".to_string())
            })
    }
}

/// Parse lifetimes such as "24h", "7d", "30m" or "45s"; bare numbers are hours
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (amount, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], c),
        _ => (value, 'h'),
    };
    let amount: i64 = amount.parse().ok()?;
    match unit {
        'd' => Some(Duration::days(amount)),
        'h' => Some(Duration::hours(amount)),
        'm' => Some(Duration::minutes(amount)),
        's' => Some(Duration::seconds(amount)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(expires_in: &str) -> JwtService {
        JwtService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in: expires_in.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("24h"), Some(Duration::hours(24)));
        assert_eq!(parse_duration("7d"), Some(Duration::days(7)));
        assert_eq!(parse_duration("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_duration("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_duration("12"), Some(Duration::hours(12)));
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_issue_then_verify() {
        let jwt = service("1h");
        let user_id = Uuid::new_v4();

        let token = jwt.issue(user_id, "admin", "admin").unwrap();
        let user = jwt.verify(&token).unwrap();

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "admin");
        assert!(user.is_super_admin());
    }

    #[test]
    fn test_verify_rejects_foreign_and_expired_tokens() {
        let other = JwtService::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            jwt_expires_in: "1h".to_string(),
        })
        .unwrap();
        let token = other.issue(Uuid::new_v4(), "editor", "editor").unwrap();
        assert!(matches!(
            service("1h").verify(&token),
            Err(AppError::Unauthorized(_))
        ));

        // Beyond the default 60s leeway
        let expired = service("-5m").issue(Uuid::new_v4(), "editor", "editor").unwrap();
        assert!(service("1h").verify(&expired).is_err());
    }

    #[test]
    fn test_rejects_invalid_lifetime() {
        let result = JwtService::new(&AuthConfig {
            jwt_secret: "s".to_string(),
            jwt_expires_in: "soon".to_string(),
        });
        assert!(result.is_err());
    }
}
