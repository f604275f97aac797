mod employment_handler;

pub use employment_handler::{
    create_employment, delete_employment, get_employment, list_all_employment, list_employment,
    update_employment,
};
