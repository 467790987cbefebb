use super::{DocumentRole, DocumentStatus};
use serde::Serialize;
use std::fmt;

pub fn can_approve(role: DocumentRole, status: DocumentStatus) -> bool {
    role == DocumentRole::Approver && status == DocumentStatus::PendingValidation
}

pub fn can_reject(role: DocumentRole, status: DocumentStatus) -> bool {
    role == DocumentRole::Approver && status == DocumentStatus::PendingValidation
}

pub fn can_cancel_submission(role: DocumentRole, status: DocumentStatus) -> bool {
    role == DocumentRole::Creator && status == DocumentStatus::PendingValidation
}

pub fn can_edit_metadata(role: DocumentRole, status: DocumentStatus) -> bool {
    role == DocumentRole::Creator
        && matches!(
            status,
            DocumentStatus::Draft | DocumentStatus::PendingValidation
        )
}

pub fn can_submit_for_review(role: DocumentRole, status: DocumentStatus) -> bool {
    role == DocumentRole::Creator && status == DocumentStatus::Draft
}

/// Role-independent: anyone who can see a decided document may start a new
/// version. The backend refuses users without the right to do so.
pub fn can_create_new_version(status: DocumentStatus) -> bool {
    status.is_terminal()
}

/// A user-initiated step in the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    Approve,
    Reject,
    CancelSubmission,
    EditMetadata,
    SubmitForReview,
    CreateNewVersion,
}

impl DocumentAction {
    pub const ALL: [DocumentAction; 6] = [
        DocumentAction::Approve,
        DocumentAction::Reject,
        DocumentAction::CancelSubmission,
        DocumentAction::EditMetadata,
        DocumentAction::SubmitForReview,
        DocumentAction::CreateNewVersion,
    ];

    pub fn is_allowed(&self, role: DocumentRole, status: DocumentStatus) -> bool {
        match self {
            DocumentAction::Approve => can_approve(role, status),
            DocumentAction::Reject => can_reject(role, status),
            DocumentAction::CancelSubmission => can_cancel_submission(role, status),
            DocumentAction::EditMetadata => can_edit_metadata(role, status),
            DocumentAction::SubmitForReview => can_submit_for_review(role, status),
            DocumentAction::CreateNewVersion => can_create_new_version(status),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentAction::Approve => "approve",
            DocumentAction::Reject => "reject",
            DocumentAction::CancelSubmission => "cancel_submission",
            DocumentAction::EditMetadata => "edit_metadata",
            DocumentAction::SubmitForReview => "submit_for_review",
            DocumentAction::CreateNewVersion => "create_new_version",
        }
    }
}

impl fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DocumentAction::Approve => "Approving",
            DocumentAction::Reject => "Rejecting",
            DocumentAction::CancelSubmission => "Cancelling the submission",
            DocumentAction::EditMetadata => "Editing",
            DocumentAction::SubmitForReview => "Submitting for review",
            DocumentAction::CreateNewVersion => "Creating a new version",
        };
        f.write_str(text)
    }
}

/// Which buttons to show for one (role, status) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Affordances {
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_cancel_submission: bool,
    pub can_edit_metadata: bool,
    pub can_submit_for_review: bool,
    pub can_create_new_version: bool,
}

impl Affordances {
    pub fn evaluate(role: DocumentRole, status: DocumentStatus) -> Self {
        Self {
            can_approve: can_approve(role, status),
            can_reject: can_reject(role, status),
            can_cancel_submission: can_cancel_submission(role, status),
            can_edit_metadata: can_edit_metadata(role, status),
            can_submit_for_review: can_submit_for_review(role, status),
            can_create_new_version: can_create_new_version(status),
        }
    }

    pub fn allowed(&self) -> Vec<DocumentAction> {
        DocumentAction::ALL
            .into_iter()
            .filter(|action| self.permits(*action))
            .collect()
    }

    pub fn permits(&self, action: DocumentAction) -> bool {
        match action {
            DocumentAction::Approve => self.can_approve,
            DocumentAction::Reject => self.can_reject,
            DocumentAction::CancelSubmission => self.can_cancel_submission,
            DocumentAction::EditMetadata => self.can_edit_metadata,
            DocumentAction::SubmitForReview => self.can_submit_for_review,
            DocumentAction::CreateNewVersion => self.can_create_new_version,
        }
    }

    pub fn any(&self) -> bool {
        !self.allowed().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::resolve_role;

    const ROLES: [DocumentRole; 3] = [
        DocumentRole::Creator,
        DocumentRole::Approver,
        DocumentRole::Viewer,
    ];

    #[test]
    fn review_side_is_gated_by_role() {
        let status = DocumentStatus::PendingValidation;

        assert!(!can_approve(DocumentRole::Creator, status));
        assert!(!can_reject(DocumentRole::Creator, status));
        assert!(!can_cancel_submission(DocumentRole::Approver, status));

        assert!(can_approve(DocumentRole::Approver, status));
        assert!(can_reject(DocumentRole::Approver, status));
        assert!(can_cancel_submission(DocumentRole::Creator, status));
    }

    #[test]
    fn approval_requires_pending_validation() {
        for status in DocumentStatus::ALL {
            let expected = status == DocumentStatus::PendingValidation;
            assert_eq!(can_approve(DocumentRole::Approver, status), expected);
            assert_eq!(can_reject(DocumentRole::Approver, status), expected);
            assert!(!can_approve(DocumentRole::Viewer, status));
        }
    }

    #[test]
    fn new_version_only_from_terminal_states() {
        assert!(can_create_new_version(DocumentStatus::Approved));
        assert!(can_create_new_version(DocumentStatus::Rejected));
        assert!(!can_create_new_version(DocumentStatus::Draft));
        assert!(!can_create_new_version(DocumentStatus::PendingValidation));
        assert!(!can_create_new_version(DocumentStatus::Archived));
    }

    #[test]
    fn new_version_ignores_role() {
        for status in DocumentStatus::ALL {
            for role in ROLES {
                assert_eq!(
                    DocumentAction::CreateNewVersion.is_allowed(role, status),
                    can_create_new_version(status)
                );
            }
        }
    }

    #[test]
    fn submit_only_drafts_by_creator() {
        assert!(can_submit_for_review(
            DocumentRole::Creator,
            DocumentStatus::Draft
        ));
        assert!(!can_submit_for_review(
            DocumentRole::Creator,
            DocumentStatus::PendingValidation
        ));
        assert!(!can_submit_for_review(
            DocumentRole::Viewer,
            DocumentStatus::Draft
        ));
        assert!(!can_submit_for_review(
            DocumentRole::Approver,
            DocumentStatus::Draft
        ));
    }

    #[test]
    fn metadata_editable_until_decided() {
        assert!(can_edit_metadata(DocumentRole::Creator, DocumentStatus::Draft));
        assert!(can_edit_metadata(
            DocumentRole::Creator,
            DocumentStatus::PendingValidation
        ));
        assert!(!can_edit_metadata(
            DocumentRole::Creator,
            DocumentStatus::Approved
        ));
        assert!(!can_edit_metadata(
            DocumentRole::Approver,
            DocumentStatus::Draft
        ));
    }

    #[test]
    fn author_with_approve_rights_cannot_self_approve() {
        let role = resolve_role(true, true, false);
        let status = DocumentStatus::PendingValidation;

        assert_eq!(role, DocumentRole::Creator);
        assert!(!can_approve(role, status));
        assert!(can_cancel_submission(role, status));
    }

    #[test]
    fn affordances_match_predicates() {
        for status in DocumentStatus::ALL {
            for role in ROLES {
                let affordances = Affordances::evaluate(role, status);
                for action in DocumentAction::ALL {
                    assert_eq!(
                        affordances.permits(action),
                        action.is_allowed(role, status),
                        "{:?} as {} on {}",
                        action,
                        role,
                        status
                    );
                }
            }
        }
    }

    #[test]
    fn viewer_of_archived_document_has_nothing_to_do() {
        let affordances = Affordances::evaluate(DocumentRole::Viewer, DocumentStatus::Archived);
        assert!(!affordances.any());
        assert_eq!(affordances, Affordances::default());
    }

    #[test]
    fn approver_sees_both_decisions() {
        let affordances = Affordances::evaluate(
            DocumentRole::Approver,
            DocumentStatus::PendingValidation,
        );
        assert_eq!(
            affordances.allowed(),
            vec![DocumentAction::Approve, DocumentAction::Reject]
        );
    }
}
