//! News articles.
//!
//! | Method | Path             | Access           |
//! |--------|------------------|------------------|
//! | GET    | /api/news        | public           |
//! | GET    | /api/news/{id}   | public           |
//! | POST   | /api/news        | auth             |
//! | PUT    | /api/news/{id}   | author or admin  |
//! | DELETE | /api/news/{id}   | author or admin  |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NewsService;
