mod file_service;
pub mod inline_images;

pub use file_service::FileService;
