//! Shared building blocks for the evento workspace.
//!
//! Everything in this crate is free of database and HTTP dependencies so the
//! access policy can be evaluated and tested in isolation.

pub mod config;
pub mod constants;
pub mod error;
pub mod policy;
pub mod types;
