//! Project service

use std::sync::Arc;

use crate::{
    entities::{NewProject, Project, ProjectCreate, User, UNSPECIFIED_STAGE},
    errors::{DomainError, DomainResult},
    repositories::ProjectRepository,
};

pub struct ProjectService {
    repo: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> DomainResult<Vec<Project>> {
        self.repo.list().await
    }

    /// Create a project. Manager-only; the name must be non-blank and
    /// a missing stage defaults to [`UNSPECIFIED_STAGE`].
    pub async fn create(&self, actor: &User, payload: ProjectCreate) -> DomainResult<Project> {
        if !actor.role.can_create_projects() {
            return Err(DomainError::authorization(
                "only a manager can create projects",
            ));
        }

        let name = payload.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "project name is empty"));
        }

        let stage = payload
            .stage
            .filter(|stage| !stage.trim().is_empty())
            .unwrap_or_else(|| UNSPECIFIED_STAGE.to_string());

        self.repo
            .create(NewProject {
                name: name.to_string(),
                stage,
                description: payload.description,
                start_date: payload.start_date,
                end_date: payload.end_date,
                created_by: actor.id,
            })
            .await
    }
}
