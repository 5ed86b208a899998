//! End-to-end lifecycle scenarios against the in-memory backend

use std::sync::Arc;

use dtrack_domain::{
    entities::{AttachmentCreate, DefectCreate, DefectFilter, NewProject, NewUser, User},
    errors::DomainError,
    repositories::{ProjectRepository, UserRepository},
    services::{DefectService, UNKNOWN_AUTHOR},
    value_objects::{DefectStatus, Role},
    Project,
};
use dtrack_persistence::memory::{
    InMemoryDefectRepository, InMemoryProjectRepository, InMemoryUserRepository,
};

struct Fixture {
    service: DefectService,
    defects: Arc<InMemoryDefectRepository>,
    project: Project,
    manager: User,
    engineer: User,
}

async fn create_user(users: &InMemoryUserRepository, email: &str, name: &str, role: Role) -> User {
    users
        .create(NewUser {
            email: email.to_string(),
            full_name: name.to_string(),
            role,
            password_hash: String::new(),
        })
        .await
        .unwrap()
}

async fn fixture() -> Fixture {
    let defects = Arc::new(InMemoryDefectRepository::new());
    let projects = Arc::new(InMemoryProjectRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());

    let manager = create_user(&users, "mgr@example.com", "Mary Manager", Role::Manager).await;
    let engineer = create_user(&users, "eng@example.com", "Eddie Engineer", Role::Engineer).await;

    let project = projects
        .create(NewProject {
            name: "Billing".to_string(),
            stage: "Build".to_string(),
            description: String::new(),
            start_date: None,
            end_date: None,
            created_by: manager.id,
        })
        .await
        .unwrap();

    let service = DefectService::new(defects.clone(), projects, users);

    Fixture {
        service,
        defects,
        project,
        manager,
        engineer,
    }
}

fn payload(fx: &Fixture) -> DefectCreate {
    DefectCreate {
        project_id: fx.project.id,
        title: "Invoice totals drift".to_string(),
        description: "Rounding differs between preview and final".to_string(),
        priority: Some("high".to_string()),
        severity: None,
        assignee_id: None,
        due_date: None,
    }
}

#[tokio::test]
async fn test_manager_engineer_lifecycle_with_audit_trail() {
    let fx = fixture().await;

    // Manager creates; the defect starts in NEW.
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();
    assert_eq!(defect.status, DefectStatus::New);

    // Engineer tries to close straight away: authorization error, and
    // the status is untouched.
    let err = fx
        .service
        .update_status(&defect.id, &fx.engineer, "CLOSED")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
    assert_eq!(
        fx.service.get(&defect.id).await.unwrap().status,
        DefectStatus::New
    );
    assert!(fx.defects.history_for(&defect.id).is_empty());

    // Engineer starts work: one audit entry NEW -> IN_PROGRESS.
    let updated = fx
        .service
        .update_status(&defect.id, &fx.engineer, "IN_PROGRESS")
        .await
        .unwrap();
    assert_eq!(updated.status, DefectStatus::InProgress);

    let history = fx.defects.history_for(&defect.id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].field, "status");
    assert_eq!(history[0].old_value, "NEW");
    assert_eq!(history[0].new_value, "IN_PROGRESS");
    assert_eq!(history[0].actor_id, fx.engineer.id);

    // Through review, then the manager closes.
    fx.service
        .update_status(&defect.id, &fx.engineer, "IN_REVIEW")
        .await
        .unwrap();
    let closed = fx
        .service
        .update_status(&defect.id, &fx.manager, "CLOSED")
        .await
        .unwrap();
    assert_eq!(closed.status, DefectStatus::Closed);
    assert_eq!(fx.defects.history_for(&defect.id).len(), 3);
}

#[tokio::test]
async fn test_skipping_in_progress_is_a_conflict_for_any_role() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    for actor in [&fx.manager, &fx.engineer] {
        let err = fx
            .service
            .update_status(&defect.id, actor, "IN_REVIEW")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::TransitionDenied {
                from: DefectStatus::New,
                to: DefectStatus::InReview,
            }
        ));
    }
}

#[tokio::test]
async fn test_engineer_is_rejected_from_terminal_targets_at_every_stage() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    // At NEW, IN_PROGRESS and IN_REVIEW alike, an engineer asking for a
    // terminal status gets an authorization error, edge or no edge.
    for advance_to in [None, Some("IN_PROGRESS"), Some("IN_REVIEW")] {
        if let Some(status) = advance_to {
            fx.service
                .update_status(&defect.id, &fx.engineer, status)
                .await
                .unwrap();
        }

        for terminal in ["CLOSED", "CANCELED"] {
            let err = fx
                .service
                .update_status(&defect.id, &fx.engineer, terminal)
                .await
                .unwrap_err();
            assert!(
                matches!(err, DomainError::Authorization { .. }),
                "expected authorization error for {terminal}"
            );
        }
    }
}

#[tokio::test]
async fn test_self_transition_is_a_silent_no_op() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    let result = fx
        .service
        .update_status(&defect.id, &fx.engineer, " new ")
        .await
        .unwrap();

    assert_eq!(result.status, DefectStatus::New);
    assert_eq!(result.updated_at, defect.updated_at);
    assert!(fx.defects.history_for(&defect.id).is_empty());
}

#[tokio::test]
async fn test_unknown_status_fails_validation_before_load() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    let err = fx
        .service
        .update_status(&defect.id, &fx.manager, "REOPENED")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_creation_is_manager_only() {
    let fx = fixture().await;
    let err = fx
        .service
        .create(&fx.engineer, payload(&fx))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
}

#[tokio::test]
async fn test_creation_rejects_unknown_severity() {
    let fx = fixture().await;
    let mut request = payload(&fx);
    request.severity = Some("urgent".to_string());

    let err = fx.service.create(&fx.manager, request).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "severity"));
}

#[tokio::test]
async fn test_list_limit_clamping_and_lenient_filters() {
    let fx = fixture().await;
    for _ in 0..25 {
        fx.service.create(&fx.manager, payload(&fx)).await.unwrap();
    }

    for bad_limit in [0, -5, 500] {
        let items = fx
            .service
            .list(DefectFilter {
                limit: bad_limit,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(items.len(), 20, "limit {bad_limit} should clamp to 20");
    }

    let items = fx
        .service
        .list(DefectFilter {
            limit: 50,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(items.len(), 25);

    // An unrecognized status filter means "no filter", not "match
    // nothing".
    let items = fx
        .service
        .list(DefectFilter {
            status: Some("urgent".to_string()),
            limit: 50,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(items.len(), 25);

    // A recognized filter narrows as usual.
    let items = fx
        .service
        .list(DefectFilter {
            status: Some("in_progress".to_string()),
            limit: 50,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_comment_rules_and_author_fallback() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    let err = fx
        .service
        .add_comment(&defect.id, &fx.engineer.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let comment = fx
        .service
        .add_comment(&defect.id, &fx.engineer.id, "confirmed on staging")
        .await
        .unwrap();
    assert_eq!(comment.author_name, "Eddie Engineer");

    // A comment from an author the user store cannot resolve still
    // lands, with the placeholder name.
    let ghost = dtrack_domain::value_objects::UserId::new();
    let comment = fx
        .service
        .add_comment(&defect.id, &ghost, "drive-by note")
        .await
        .unwrap();
    assert_eq!(comment.author_name, UNKNOWN_AUTHOR);

    let comments = fx.service.list_comments(&defect.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments.last().unwrap().body, "drive-by note");
}

#[tokio::test]
async fn test_attachment_size_rules() {
    let fx = fixture().await;
    let defect = fx.service.create(&fx.manager, payload(&fx)).await.unwrap();

    let err = fx
        .service
        .add_attachment(AttachmentCreate {
            defect_id: defect.id,
            filename: "empty.bin".to_string(),
            content_type: "application/octet-stream".to_string(),
            size_bytes: 0,
            storage_key: "k1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let attachment = fx
        .service
        .add_attachment(AttachmentCreate {
            defect_id: defect.id,
            filename: "one-byte.bin".to_string(),
            content_type: "application/octet-stream".to_string(),
            size_bytes: 1,
            storage_key: "k2".to_string(),
        })
        .await
        .unwrap();

    let fetched = fx
        .service
        .get_attachment(&defect.id, &attachment.id)
        .await
        .unwrap();
    assert_eq!(fetched.size_bytes, 1);

    fx.service
        .add_attachment(AttachmentCreate {
            defect_id: defect.id,
            filename: "screenshot.png".to_string(),
            content_type: "image/png".to_string(),
            size_bytes: 2048,
            storage_key: "k3".to_string(),
        })
        .await
        .unwrap();

    // Newest uploads first.
    let attachments = fx.service.list_attachments(&defect.id).await.unwrap();
    assert_eq!(attachments.len(), 2);
    assert!(attachments
        .windows(2)
        .all(|w| w[0].uploaded_at >= w[1].uploaded_at));
}

#[tokio::test]
async fn test_defect_for_missing_project_is_not_found() {
    let fx = fixture().await;
    let mut request = payload(&fx);
    request.project_id = dtrack_domain::value_objects::ProjectId::new();

    let err = fx.service.create(&fx.manager, request).await.unwrap_err();
    assert!(matches!(err, DomainError::EntityNotFound { entity, .. } if entity == "project"));
}
