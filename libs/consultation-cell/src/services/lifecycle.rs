use tracing::{debug, warn};

use shared_models::auth::UserRole;

use crate::models::{Consultation, ConsultationAction, ConsultationError, ConsultationStatus};

pub struct ConsultationLifecycleService;

impl ConsultationLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Get all statuses reachable from a given current status.
    pub fn valid_transitions(&self, current: ConsultationStatus) -> Vec<ConsultationStatus> {
        match current {
            ConsultationStatus::Pending => vec![
                ConsultationStatus::Accepted,
                ConsultationStatus::Cancelled,
            ],
            ConsultationStatus::Accepted => vec![
                ConsultationStatus::InReview,
                ConsultationStatus::Prescribed,
                ConsultationStatus::FollowUp,
                ConsultationStatus::Completed,
            ],
            ConsultationStatus::InReview => vec![
                ConsultationStatus::Prescribed,
                ConsultationStatus::FollowUp,
                ConsultationStatus::Completed,
            ],
            ConsultationStatus::Prescribed => vec![
                ConsultationStatus::FollowUp,
                ConsultationStatus::Completed,
            ],
            ConsultationStatus::FollowUp => vec![
                ConsultationStatus::Prescribed,
                ConsultationStatus::Completed,
            ],
            // Terminal states - no transitions allowed
            ConsultationStatus::Completed => vec![],
            ConsultationStatus::Cancelled => vec![],
        }
    }

    /// Status the action lands in when it succeeds.
    pub fn target_status(&self, action: &ConsultationAction) -> ConsultationStatus {
        match action {
            ConsultationAction::Accept => ConsultationStatus::Accepted,
            ConsultationAction::StartReview => ConsultationStatus::InReview,
            ConsultationAction::Prescribe { .. } => ConsultationStatus::Prescribed,
            ConsultationAction::FollowUp { .. } => ConsultationStatus::FollowUp,
            ConsultationAction::Complete => ConsultationStatus::Completed,
            ConsultationAction::Cancel => ConsultationStatus::Cancelled,
        }
    }

    /// Validate that an actor may perform an action against the
    /// consultation's current state.
    ///
    /// Accept is the only contended action; its status gate here is
    /// advisory and the real arbiter is the conditional write keyed on
    /// `status = pending`.
    pub fn authorize_action(
        &self,
        consultation: &Consultation,
        action: &ConsultationAction,
        actor_id: &str,
        actor_role: UserRole,
    ) -> Result<(), ConsultationError> {
        debug!(
            "Authorizing {} on consultation {} (status {})",
            action.name(),
            consultation.id,
            consultation.status
        );

        if consultation.status.is_terminal() {
            warn!(
                "Action {} attempted on terminal consultation {}",
                action.name(),
                consultation.id
            );
            return Err(ConsultationError::Terminal(consultation.status));
        }

        match action {
            ConsultationAction::Accept => {
                if actor_role != UserRole::Doctor {
                    return Err(ConsultationError::NotDoctor);
                }
                if consultation.status != ConsultationStatus::Pending {
                    return Err(ConsultationError::AlreadyClaimed);
                }
            }
            ConsultationAction::StartReview => {
                self.require_assignee(consultation, actor_id, actor_role)?;
                if consultation.status != ConsultationStatus::Accepted {
                    return Err(ConsultationError::InvalidTransition {
                        from: consultation.status,
                        action: "start_review",
                    });
                }
            }
            ConsultationAction::Prescribe { .. }
            | ConsultationAction::FollowUp { .. }
            | ConsultationAction::Complete => {
                self.require_assignee(consultation, actor_id, actor_role)?;
            }
            ConsultationAction::Cancel => {
                if actor_role != UserRole::Patient || consultation.patient_id != actor_id {
                    return Err(ConsultationError::NotOwner);
                }
                if consultation.status != ConsultationStatus::Pending {
                    return Err(ConsultationError::NotCancellable);
                }
            }
        }

        Ok(())
    }

    fn require_assignee(
        &self,
        consultation: &Consultation,
        actor_id: &str,
        actor_role: UserRole,
    ) -> Result<(), ConsultationError> {
        if actor_role != UserRole::Doctor {
            return Err(ConsultationError::NotDoctor);
        }
        if consultation.doctor_id.as_deref() != Some(actor_id) {
            return Err(ConsultationError::NotAssigned);
        }
        Ok(())
    }
}

impl Default for ConsultationLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
