use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminSeedConfig,
    pub storage: StorageConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime, e.g. "24h", "7d", "30m"
    pub jwt_expires_in: String,
}

/// Account created at start-up when no admin exists yet
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Local disk storage for uploaded files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `<owner_id>/<file_id>.<ext>` files
    pub upload_dir: String,
    /// Public base URL used to build file URLs (`{base_url}/uploads/...`)
    pub public_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStoreKind {
    Redis,
    Memory,
}

/// What the limiter does when the counter store cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Let the request through
    Open,
    /// Reject the request with 503
    Closed,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub max_retries: usize,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub store: CounterStoreKind,
    pub redis: RedisConfig,
    pub api_max: u64,
    pub api_window: Duration,
    pub api_message: String,
    pub login_max: u64,
    pub login_window: Duration,
    pub login_message: String,
    pub whitelist: Vec<String>,
    /// Take the client address from X-Forwarded-For / X-Real-IP
    pub trust_proxy: bool,
    pub failure_mode: FailureMode,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            admin: AdminSeedConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool, String> {
    match env::var(key) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(format!("{} must be a boolean, got '{}'", key, other)),
        },
        Err(_) => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());

        let cors_allowed_origins =
            parse_list(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let max_request_body_size =
            parse_env("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            environment,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_EXPIRES_IN: &'static str = "24h";

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET environment variable is required".to_string())?;

        let jwt_expires_in =
            env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| Self::DEFAULT_JWT_EXPIRES_IN.to_string());

        Ok(Self {
            jwt_secret,
            jwt_expires_in,
        })
    }
}

impl AdminSeedConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
            password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5001".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            upload_dir,
            public_base_url,
        })
    }
}

impl RateLimitConfig {
    const DEFAULT_API_MAX: u64 = 30;
    const DEFAULT_API_WINDOW_SECS: u64 = 60; // 1 minute
    const DEFAULT_LOGIN_MAX: u64 = 5;
    const DEFAULT_LOGIN_WINDOW_SECS: u64 = 60 * 60; // 1 hour
    const DEFAULT_REDIS_PORT: u16 = 6379;
    const DEFAULT_REDIS_MAX_RETRIES: usize = 3;
    const DEFAULT_WHITELIST: &'static str = "127.0.0.1,localhost,::1,::ffff:127.0.0.1";

    pub fn from_env() -> Result<Self, String> {
        let store = match env::var("RATE_LIMIT_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => CounterStoreKind::Redis,
            "memory" => CounterStoreKind::Memory,
            other => return Err(format!("RATE_LIMIT_STORE must be 'redis' or 'memory', got '{}'", other)),
        };

        let failure_mode = match env::var("RATE_LIMIT_FAIL_MODE")
            .unwrap_or_else(|_| "open".to_string())
            .to_lowercase()
            .as_str()
        {
            "open" => FailureMode::Open,
            "closed" => FailureMode::Closed,
            other => return Err(format!("RATE_LIMIT_FAIL_MODE must be 'open' or 'closed', got '{}'", other)),
        };

        let redis = RedisConfig {
            host: env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: parse_env("REDIS_PORT", Self::DEFAULT_REDIS_PORT)?,
            password: env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            max_retries: parse_env("REDIS_MAX_RETRIES", Self::DEFAULT_REDIS_MAX_RETRIES)?,
        };

        Ok(Self {
            store,
            redis,
            api_max: parse_env("RATE_LIMIT_API_MAX", Self::DEFAULT_API_MAX)?,
            api_window: Duration::from_secs(parse_env(
                "RATE_LIMIT_API_WINDOW_SECS",
                Self::DEFAULT_API_WINDOW_SECS,
            )?),
            api_message: env::var("RATE_LIMIT_API_MESSAGE")
                .unwrap_or_else(|_| "Too many requests, please try again later".to_string()),
            login_max: parse_env("RATE_LIMIT_LOGIN_MAX", Self::DEFAULT_LOGIN_MAX)?,
            login_window: Duration::from_secs(parse_env(
                "RATE_LIMIT_LOGIN_WINDOW_SECS",
                Self::DEFAULT_LOGIN_WINDOW_SECS,
            )?),
            login_message: env::var("RATE_LIMIT_LOGIN_MESSAGE").unwrap_or_else(|_| {
                "Too many login attempts, please try again in an hour".to_string()
            }),
            whitelist: parse_list(
                &env::var("RATE_LIMIT_WHITELIST")
                    .unwrap_or_else(|_| Self::DEFAULT_WHITELIST.to_string()),
            ),
            trust_proxy: parse_bool_env("RATE_LIMIT_TRUST_PROXY", false)?,
            failure_mode,
        })
    }
}

impl RedisConfig {
    /// Connection URL understood by the `redis` crate
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/",
                urlencoding::encode(password),
                self.host,
                self.port
            ),
            None => format!("redis://{}:{}/", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url_with_and_without_password() {
        let mut redis = RedisConfig {
            host: "cache".to_string(),
            port: 6380,
            password: None,
            max_retries: 3,
        };
        assert_eq!(redis.url(), "redis://cache:6380/");

        redis.password = Some("s3cret".to_string());
        assert_eq!(redis.url(), "redis://:s3cret@cache:6380/");

        redis.password = Some("p@ss/w:rd#1".to_string());
        assert_eq!(redis.url(), "redis://:p%40ss%2Fw%3Ard%231@cache:6380/");
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" 127.0.0.1, ::1 ,,localhost"),
            vec!["127.0.0.1", "::1", "localhost"]
        );
    }
}
