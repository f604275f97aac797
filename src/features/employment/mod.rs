//! Employment news and policy articles.
//!
//! | Method | Path                   | Access           |
//! |--------|------------------------|------------------|
//! | GET    | /api/employment/all    | public           |
//! | GET    | /api/employment        | public           |
//! | GET    | /api/employment/{id}   | public           |
//! | POST   | /api/employment        | auth             |
//! | PUT    | /api/employment/{id}   | author or admin  |
//! | DELETE | /api/employment/{id}   | author or admin  |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::EmploymentService;
