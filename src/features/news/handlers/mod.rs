mod news_handler;

pub use news_handler::{create_news, delete_news, get_news, list_news, update_news};
