//! User account management.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Access |
//! |--------|----------|--------|
//! | GET | `/api/users` | authenticated |
//! | POST | `/api/users` | admin |
//! | GET | `/api/users/{id}` | admin |
//! | PUT | `/api/users/{id}` | self or admin; role changes need the super admin |
//! | DELETE | `/api/users/{id}` | super admin; admins cannot be deleted |
//! | PATCH | `/api/users/{id}/toggle-status` | admin |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
