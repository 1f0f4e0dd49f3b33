//! Core abstractions for taskus: the task model, pure collection operations,
//! the view filter, and the storage/persistence contracts.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod collection;
pub mod filter;
pub mod ids;
pub mod persistence;
pub mod storage;
pub mod tasks;
