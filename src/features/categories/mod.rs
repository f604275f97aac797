//! News categories.
//!
//! | Method | Path                  | Access            |
//! |--------|-----------------------|-------------------|
//! | GET    | /api/categories/all   | public            |
//! | GET    | /api/categories       | auth              |
//! | POST   | /api/categories       | auth              |
//! | PUT    | /api/categories/{id}  | creator or admin  |
//! | DELETE | /api/categories/{id}  | creator or admin  |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
