//! Application state for the API server

use std::sync::Arc;
use std::time::Instant;

use dtrack_domain::services::{DefectService, ProjectService};
use dtrack_storage::StorageProvider;

use crate::auth::AuthService;

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Defect aggregate manager
    pub defects: Arc<DefectService>,
    /// Project service
    pub projects: Arc<ProjectService>,
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Attachment byte storage
    pub storage: Arc<dyn StorageProvider>,
    /// Server start time for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        defects: Arc<DefectService>,
        projects: Arc<ProjectService>,
        auth: Arc<AuthService>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            defects,
            projects,
            auth,
            storage,
            start_time: Instant::now(),
        }
    }

    /// Server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
