//! DTrack domain layer
//!
//! Entities, value objects, the defect lifecycle transition policy,
//! repository contracts and the domain services. This crate performs no
//! I/O of its own: persistence and storage are reached exclusively
//! through the traits in [`repositories`], and credential mechanics
//! (token signing, password hashing) live at the API boundary.

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod value_objects;
pub mod workflow;

pub use entities::{
    Attachment, AttachmentCreate, Comment, Defect, DefectCreate, DefectFilter, DefectListItem,
    DefectQuery, HistoryEntry, NewComment, NewDefect, NewProject, NewUser, Project, ProjectCreate,
    RefreshToken, User,
};
pub use errors::{DomainError, DomainResult};
pub use repositories::{DefectRepository, ProjectRepository, TokenRepository, UserRepository};
pub use services::{DefectService, ProjectService};
pub use value_objects::{
    AttachmentId, CommentId, DefectId, DefectStatus, Priority, ProjectId, Role, UserId,
};
