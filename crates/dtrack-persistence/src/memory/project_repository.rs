//! In-memory project repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use dtrack_domain::{
    entities::{NewProject, Project},
    errors::{DomainError, DomainResult},
    repositories::ProjectRepository,
    value_objects::ProjectId,
};

/// Thread-safe in-memory implementation of [`ProjectRepository`]
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

impl InMemoryProjectRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial projects (useful for testing)
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let map = projects
            .into_iter()
            .map(|project| (project.id, project))
            .collect();
        Self {
            projects: RwLock::new(map),
        }
    }

    /// Number of stored projects (for testing)
    pub fn count(&self) -> usize {
        self.projects.read().len()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list(&self) -> DomainResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.projects.read().values().cloned().collect();
        projects.sort_by_key(|project| project.created_at);
        Ok(projects)
    }

    async fn create(&self, project: NewProject) -> DomainResult<Project> {
        let now = Utc::now();
        let stored = Project {
            id: ProjectId::new(),
            name: project.name,
            stage: project.stage,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
            created_by: project.created_by,
            created_at: now,
            updated_at: now,
        };
        self.projects.write().insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &ProjectId) -> DomainResult<Project> {
        self.projects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("project", id))
    }
}
