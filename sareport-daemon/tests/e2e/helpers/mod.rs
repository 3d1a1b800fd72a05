//! Shared E2E test helpers.
//!
//! Provides a temporary workspace with input/result/archive directories,
//! report fixtures, and polling assertions for files appearing on disk.

pub mod assertions;
pub mod reports;
pub mod workspace;
