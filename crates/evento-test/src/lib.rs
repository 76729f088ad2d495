//! Evento - integration test support.
//!
//! Provides an in-memory store so the HTTP tests can drive the full router
//! without a database, and re-exports the workspace crates under short paths.

pub mod memory;

pub use memory::MemoryStore;

pub use evento_app as app;
pub use evento_db as db;
pub use evento_service as service;
