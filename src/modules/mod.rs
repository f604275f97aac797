//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for file storage and the rate-limit counter store.

pub mod counter_store;
pub mod storage;
