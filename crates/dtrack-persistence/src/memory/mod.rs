//! Thread-safe in-memory repository implementations
//!
//! Default backend for tests and development. `parking_lot::RwLock`
//! guards plain maps/vectors; stored values are cloned on the way out
//! to keep callers isolated.

mod defect_repository;
mod project_repository;
mod token_repository;
mod user_repository;

pub use defect_repository::InMemoryDefectRepository;
pub use project_repository::InMemoryProjectRepository;
pub use token_repository::InMemoryTokenRepository;
pub use user_repository::InMemoryUserRepository;
