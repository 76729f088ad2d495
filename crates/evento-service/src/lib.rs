pub mod account;
pub mod auth;
pub mod error;
pub mod event;
pub mod validation;
