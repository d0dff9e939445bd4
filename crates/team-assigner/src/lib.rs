// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod app;
pub mod assign;
pub mod config;
pub mod loader;
pub mod pairs;
pub mod registrant;
pub mod summary;
pub mod writer;
