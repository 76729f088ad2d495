pub mod helpers;

mod admin;
mod auth;
mod events;
mod pg_store;
