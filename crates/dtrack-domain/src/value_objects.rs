//! Value objects representing immutable domain concepts

use std::fmt;

use serde::{Deserialize, Serialize};

/// Defect identifier - a UUID-based identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefectId(uuid::Uuid);

/// Project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(uuid::Uuid);

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(uuid::Uuid);

/// Comment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(uuid::Uuid);

/// Attachment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(uuid::Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Generate a new random identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Parse from string representation
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }

            /// Access the underlying UUID
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id!(DefectId);
uuid_id!(ProjectId);
uuid_id!(UserId);
uuid_id!(CommentId);
uuid_id!(AttachmentId);

/// Defect lifecycle status
///
/// The wire format is the canonical SCREAMING_SNAKE string
/// (`NEW`, `IN_PROGRESS`, ...). Legal movements between statuses are
/// defined by [`crate::workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectStatus {
    New,
    InProgress,
    InReview,
    Closed,
    Canceled,
}

impl DefectStatus {
    /// Every status, in lifecycle order
    pub const ALL: [DefectStatus; 5] = [
        DefectStatus::New,
        DefectStatus::InProgress,
        DefectStatus::InReview,
        DefectStatus::Closed,
        DefectStatus::Canceled,
    ];

    /// Canonical wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            DefectStatus::New => "NEW",
            DefectStatus::InProgress => "IN_PROGRESS",
            DefectStatus::InReview => "IN_REVIEW",
            DefectStatus::Closed => "CLOSED",
            DefectStatus::Canceled => "CANCELED",
        }
    }

    /// Canonicalize free-text input against the status vocabulary.
    ///
    /// Trims surrounding whitespace and upper-cases before matching;
    /// anything outside the vocabulary is `None`, not an error.
    pub fn normalize(raw: &str) -> Option<Self> {
        match canonical_upper(raw).as_str() {
            "NEW" => Some(DefectStatus::New),
            "IN_PROGRESS" => Some(DefectStatus::InProgress),
            "IN_REVIEW" => Some(DefectStatus::InReview),
            "CLOSED" => Some(DefectStatus::Closed),
            "CANCELED" => Some(DefectStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority scale, shared by the defect `priority` and `severity` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Canonical wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }

    /// Canonicalize free-text input against the priority vocabulary.
    ///
    /// Same contract as [`DefectStatus::normalize`].
    pub fn normalize(raw: &str) -> Option<Self> {
        match canonical_upper(raw).as_str() {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "CRITICAL" => Some(Priority::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role, a closed enumeration used for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Engineer,
    Observer,
}

impl Role {
    /// Canonical wire representation (lowercase)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Engineer => "engineer",
            Role::Observer => "observer",
        }
    }

    /// Canonicalize free-text input against the role vocabulary
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manager" => Some(Role::Manager),
            "engineer" => Some(Role::Engineer),
            "observer" => Some(Role::Observer),
            _ => None,
        }
    }

    /// Whether this role may move a defect into a terminal status
    pub const fn can_close_or_cancel(&self) -> bool {
        matches!(self, Role::Manager)
    }

    /// Whether this role may create defects
    pub const fn can_create_defects(&self) -> bool {
        matches!(self, Role::Manager)
    }

    /// Whether this role may create projects
    pub const fn can_create_projects(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared canonicalization for the upper-case enum vocabularies
fn canonical_upper(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
