//! Accounts: registration, login, the bootstrap superuser and role management.
//!
//! ## Module Organization
//!
//! - `bootstrap`: superuser account ensured at startup
//! - `login`: credential checks, sessions and the post-login redirect
//! - `register`: self-service registration
//! - `roles`: group membership and staff flag changes made by superusers

mod bootstrap;
mod login;
mod register;
mod roles;

pub use bootstrap::ensure_bootstrap_admin;
pub use login::{LoginForm, login, logout, safe_next};
pub use register::{RegisterForm, register};
pub use roles::{assign_group, revoke_group, set_staff};
