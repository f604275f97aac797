mod category_handler;

pub use category_handler::{
    create_category, delete_category, list_all_categories, list_categories, update_category,
};
