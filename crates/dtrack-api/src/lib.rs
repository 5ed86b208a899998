//! DTrack RESTful API
//!
//! HTTP surface over the defect-tracking core: authentication, project
//! and defect endpoints, attachment upload/download and OpenAPI
//! documentation.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use server::ApiServer;
pub use state::AppState;
