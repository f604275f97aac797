pub mod user_handler;

pub use user_handler::{
    create_user, delete_user, get_user, list_users, toggle_user_status, update_user,
};
