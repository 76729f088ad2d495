pub mod event;
pub mod group;
pub mod session;
pub mod user;
