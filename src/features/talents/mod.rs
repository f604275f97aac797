//! Recommended talents.
//!
//! | Method | Path                         | Access                |
//! |--------|------------------------------|-----------------------|
//! | GET    | /api/talents                 | public                |
//! | GET    | /api/talents/{id}            | public                |
//! | POST   | /api/talents                 | auth                  |
//! | PUT    | /api/talents/{id}            | recommender or admin  |
//! | DELETE | /api/talents/{id}            | recommender or admin  |
//! | PATCH  | /api/talents/{id}/featured   | admin                 |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::TalentService;
