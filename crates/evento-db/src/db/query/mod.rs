//! Boxed diesel query builders.
//!
//! Builders only construct queries; executing them is the store's job.

pub mod account;
pub mod event;
