//! Projects that defects belong to

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ProjectId, UserId};

/// Fallback stage label when a project is created without one
pub const UNSPECIFIED_STAGE: &str = "Unspecified";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub stage: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload as received from the transport layer
#[derive(Debug, Clone, Default)]
pub struct ProjectCreate {
    pub name: String,
    pub stage: Option<String>,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A validated project ready to persist
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub stage: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: UserId,
}
