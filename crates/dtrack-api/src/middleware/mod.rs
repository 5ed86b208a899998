//! Request middleware

pub mod auth;
pub mod logging;

pub use auth::{require_auth, CurrentUser};
pub use logging::request_logging;
