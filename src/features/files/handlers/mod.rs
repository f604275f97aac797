mod file_handler;

pub use file_handler::{delete_file, list_files, upload_file};
