//! Storage module for file management
//!
//! Provides the local disk store for uploaded files and the URLs they are
//! served under.

mod local_storage;

pub use local_storage::{LocalStorage, StoredObject, UPLOADS_ROUTE};
