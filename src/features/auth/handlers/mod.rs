pub mod auth_handler;

pub use auth_handler::{dev_credentials, get_me, login, update_profile};
