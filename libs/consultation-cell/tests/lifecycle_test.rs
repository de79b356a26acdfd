use assert_matches::assert_matches;
use chrono::Utc;
use uuid::Uuid;

use consultation_cell::models::{
    Consultation, ConsultationAction, ConsultationError, ConsultationStatus,
};
use consultation_cell::services::ConsultationLifecycleService;
use shared_models::auth::UserRole;

fn consultation(
    status: ConsultationStatus,
    patient_id: &str,
    doctor_id: Option<&str>,
) -> Consultation {
    Consultation {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        doctor_id: doctor_id.map(String::from),
        status,
        chief_complaint: "persistent cough".to_string(),
        video_url: None,
        video_duration_seconds: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        accepted_at: None,
        completed_at: None,
    }
}

#[test]
fn pending_transitions_to_accepted_or_cancelled() {
    let service = ConsultationLifecycleService::new();
    let transitions = service.valid_transitions(ConsultationStatus::Pending);

    assert_eq!(transitions.len(), 2);
    assert!(transitions.contains(&ConsultationStatus::Accepted));
    assert!(transitions.contains(&ConsultationStatus::Cancelled));
}

#[test]
fn terminal_statuses_have_no_transitions() {
    let service = ConsultationLifecycleService::new();

    assert!(service.valid_transitions(ConsultationStatus::Completed).is_empty());
    assert!(service.valid_transitions(ConsultationStatus::Cancelled).is_empty());
}

#[test]
fn prescribed_and_follow_up_can_alternate() {
    let service = ConsultationLifecycleService::new();

    assert!(service
        .valid_transitions(ConsultationStatus::Prescribed)
        .contains(&ConsultationStatus::FollowUp));
    assert!(service
        .valid_transitions(ConsultationStatus::FollowUp)
        .contains(&ConsultationStatus::Prescribed));
}

#[test]
fn target_status_maps_every_action() {
    let service = ConsultationLifecycleService::new();

    assert_eq!(
        service.target_status(&ConsultationAction::Accept),
        ConsultationStatus::Accepted
    );
    assert_eq!(
        service.target_status(&ConsultationAction::StartReview),
        ConsultationStatus::InReview
    );
    assert_eq!(
        service.target_status(&ConsultationAction::Complete),
        ConsultationStatus::Completed
    );
    assert_eq!(
        service.target_status(&ConsultationAction::Cancel),
        ConsultationStatus::Cancelled
    );
}

#[test]
fn doctor_can_accept_pending() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Pending, "patient-1", None);

    let result = service.authorize_action(&c, &ConsultationAction::Accept, "doc-1", UserRole::Doctor);
    assert!(result.is_ok());
}

#[test]
fn patient_cannot_accept() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Pending, "patient-1", None);

    let result =
        service.authorize_action(&c, &ConsultationAction::Accept, "patient-1", UserRole::Patient);
    assert_matches!(result, Err(ConsultationError::NotDoctor));
}

#[test]
fn accept_on_claimed_consultation_conflicts() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Accepted, "patient-1", Some("doc-1"));

    let result = service.authorize_action(&c, &ConsultationAction::Accept, "doc-2", UserRole::Doctor);
    assert_matches!(result, Err(ConsultationError::AlreadyClaimed));
}

#[test]
fn start_review_requires_accepted_status() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::InReview, "patient-1", Some("doc-1"));

    let result =
        service.authorize_action(&c, &ConsultationAction::StartReview, "doc-1", UserRole::Doctor);
    assert_matches!(
        result,
        Err(ConsultationError::InvalidTransition {
            from: ConsultationStatus::InReview,
            ..
        })
    );
}

#[test]
fn only_assigned_doctor_can_advance() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Accepted, "patient-1", Some("doc-1"));

    let result =
        service.authorize_action(&c, &ConsultationAction::Complete, "doc-2", UserRole::Doctor);
    assert_matches!(result, Err(ConsultationError::NotAssigned));

    let result =
        service.authorize_action(&c, &ConsultationAction::Complete, "doc-1", UserRole::Doctor);
    assert!(result.is_ok());
}

#[test]
fn prescribe_requires_doctor_role() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::InReview, "patient-1", Some("doc-1"));

    let action = ConsultationAction::Prescribe {
        prescription: None,
        note: None,
    };
    let result = service.authorize_action(&c, &action, "patient-1", UserRole::Patient);
    assert_matches!(result, Err(ConsultationError::NotDoctor));
}

#[test]
fn owner_can_cancel_while_pending() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Pending, "patient-1", None);

    let result =
        service.authorize_action(&c, &ConsultationAction::Cancel, "patient-1", UserRole::Patient);
    assert!(result.is_ok());
}

#[test]
fn cancel_denied_once_accepted() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Accepted, "patient-1", Some("doc-1"));

    let result =
        service.authorize_action(&c, &ConsultationAction::Cancel, "patient-1", UserRole::Patient);
    assert_matches!(result, Err(ConsultationError::NotCancellable));
}

#[test]
fn cancel_denied_for_non_owner() {
    let service = ConsultationLifecycleService::new();
    let c = consultation(ConsultationStatus::Pending, "patient-1", None);

    let result =
        service.authorize_action(&c, &ConsultationAction::Cancel, "patient-2", UserRole::Patient);
    assert_matches!(result, Err(ConsultationError::NotOwner));

    let result =
        service.authorize_action(&c, &ConsultationAction::Cancel, "doc-1", UserRole::Doctor);
    assert_matches!(result, Err(ConsultationError::NotOwner));
}

#[test]
fn terminal_consultations_reject_every_action() {
    let service = ConsultationLifecycleService::new();

    for status in [ConsultationStatus::Completed, ConsultationStatus::Cancelled] {
        let c = consultation(status, "patient-1", Some("doc-1"));

        let result =
            service.authorize_action(&c, &ConsultationAction::Complete, "doc-1", UserRole::Doctor);
        assert_matches!(result, Err(ConsultationError::Terminal(_)));

        let result =
            service.authorize_action(&c, &ConsultationAction::Cancel, "patient-1", UserRole::Patient);
        assert_matches!(result, Err(ConsultationError::Terminal(_)));
    }
}
