//! Concrete key-value storage backed by the local filesystem.

pub mod file_store;
