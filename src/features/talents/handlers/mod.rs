mod talent_handler;

pub use talent_handler::{
    create_talent, delete_talent, get_talent, list_talents, set_talent_featured, update_talent,
};
