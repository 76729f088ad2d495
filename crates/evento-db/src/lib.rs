//! Persistence for evento: diesel schema, row models, and the store traits
//! the service layer talks to.

pub mod db;
pub mod error;
pub mod model;
