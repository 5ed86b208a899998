//! DTrack persistence layer
//!
//! Infrastructure implementations of the repository contracts defined
//! in `dtrack-domain`:
//!
//! - **In-memory repositories**: thread-safe implementations for tests
//!   and development (default).
//! - **PostgreSQL repositories**: production persistence behind the
//!   `postgres` feature, with embedded migrations.
//!
//! ```ignore
//! use dtrack_domain::repositories::DefectRepository;
//! use dtrack_persistence::memory::InMemoryDefectRepository;
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn DefectRepository> = Arc::new(InMemoryDefectRepository::new());
//! ```

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{
    InMemoryDefectRepository, InMemoryProjectRepository, InMemoryTokenRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use postgres::{
    connect, PgDefectRepository, PgProjectRepository, PgTokenRepository, PgUserRepository,
};
