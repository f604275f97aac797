pub mod auth_service;
pub mod jwt_service;
pub mod password;

pub use auth_service::AuthService;
pub use jwt_service::JwtService;
