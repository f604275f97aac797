//! Uploaded files and their references from content.
//!
//! | Method | Path                    | Access |
//! |--------|-------------------------|--------|
//! | POST   | /api/upload             | auth   |
//! | GET    | /api/upload             | auth   |
//! | DELETE | /api/upload/{file_id}   | owner  |
//!
//! News covers, talent avatars and employment covers embed a [`models::FileSnapshot`]
//! rather than a foreign key; deleting a file clears every snapshot of it.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
