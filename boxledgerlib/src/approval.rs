//! Admin review of exhibitor submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{FieldErrors, LedgerError, Result},
    submission::{CollectionSubmission, Review, SubmissionStatus},
    traits::CollectionRecordRepository,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ApprovalCommand {
    Approve { comment: Option<String> },
    Reject { reason: String },
    /// Hides the submission from normal listings; it stays recoverable.
    Archive,
}

impl ApprovalCommand {
    const fn verb(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::Archive => "archive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub submission_id: String,
    pub reviewer: String,
    pub at: DateTime<Utc>,
    pub command: ApprovalCommand,
}

#[derive(Debug)]
pub enum ApprovalOutcome {
    Approved,
    Rejected(String),
    Archived,
    Failed(LedgerError),
}

impl ApprovalOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub struct ApprovalService<R> {
    repo: R,
}

impl<R: CollectionRecordRepository> ApprovalService<R> {
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    pub const fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Applies one command. The repository is untouched when the outcome is
    /// [`ApprovalOutcome::Failed`].
    pub fn execute(&mut self, request: ApprovalRequest) -> ApprovalOutcome {
        match self.apply(request) {
            Ok(outcome) => outcome,
            Err(e) => ApprovalOutcome::Failed(e),
        }
    }

    fn apply(&mut self, request: ApprovalRequest) -> Result<ApprovalOutcome> {
        let current = self
            .repo
            .get(&request.submission_id)
            .ok_or_else(|| LedgerError::NotFound(request.submission_id.clone()))?;

        check_transition(current, &request.command)?;

        let mut updated = current.clone();
        let outcome = match request.command {
            ApprovalCommand::Approve { comment } => {
                updated.status = SubmissionStatus::Approved;
                updated.review = Review {
                    reviewed_by: Some(request.reviewer.clone()),
                    reviewed_at: Some(request.at),
                    comment: comment.filter(|c| !c.trim().is_empty()),
                };
                ApprovalOutcome::Approved
            }
            ApprovalCommand::Reject { reason } => {
                updated.status = SubmissionStatus::Rejected;
                updated.review = Review {
                    reviewed_by: Some(request.reviewer.clone()),
                    reviewed_at: Some(request.at),
                    comment: Some(reason.clone()),
                };
                ApprovalOutcome::Rejected(reason)
            }
            ApprovalCommand::Archive => {
                updated.status = SubmissionStatus::Archived;
                ApprovalOutcome::Archived
            }
        };

        info!(
            id = %updated.id,
            reviewer = %request.reviewer,
            status = %updated.status,
            "submission reviewed"
        );
        self.repo.update(updated)?;
        Ok(outcome)
    }
}

fn check_transition(s: &CollectionSubmission, command: &ApprovalCommand) -> Result<()> {
    let allowed = match command {
        ApprovalCommand::Approve { .. } => s.status == SubmissionStatus::Pending,
        ApprovalCommand::Reject { reason } => {
            if reason.trim().is_empty() {
                let mut errors = FieldErrors::default();
                errors.push("reason", "Rejection reason is required");
                return errors.into_result();
            }
            s.status == SubmissionStatus::Pending
        }
        ApprovalCommand::Archive => s.status != SubmissionStatus::Archived,
    };
    if allowed {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition {
            id: s.id.clone(),
            status: s.status.to_string(),
            action: command.verb(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::{sources::memory::InMemoryRepository, submission::ShowSlot};

    fn service() -> ApprovalService<InMemoryRepository> {
        let mut s = CollectionSubmission::new(
            "COL-1",
            "MOV-2023-001",
            "EXH-001",
            NaiveDate::from_ymd_opt(2023, 12, 12).unwrap(),
        );
        s.shows.matinee = ShowSlot::new(1, 100, 20_000);
        ApprovalService::new(InMemoryRepository::with_submissions([s]).unwrap())
    }

    fn request(command: ApprovalCommand) -> ApprovalRequest {
        ApprovalRequest {
            submission_id: "COL-1".into(),
            reviewer: "Admin User".into(),
            at: Utc.with_ymd_and_hms(2023, 12, 13, 9, 30, 0).unwrap(),
            command,
        }
    }

    #[test]
    fn approve_records_reviewer() {
        let mut svc = service();
        let out = svc.execute(request(ApprovalCommand::Approve {
            comment: Some("ok".into()),
        }));
        assert!(matches!(out, ApprovalOutcome::Approved));

        let s = svc.repository().get("COL-1").unwrap();
        assert_eq!(s.status, SubmissionStatus::Approved);
        assert_eq!(s.review.reviewed_by.as_deref(), Some("Admin User"));
        assert_eq!(s.review.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn reject_needs_reason() {
        let mut svc = service();
        let out = svc.execute(request(ApprovalCommand::Reject {
            reason: "  ".into(),
        }));
        assert!(matches!(out, ApprovalOutcome::Failed(LedgerError::Config(_))));
        assert_eq!(
            svc.repository().get("COL-1").unwrap().status,
            SubmissionStatus::Pending
        );

        let out = svc.execute(request(ApprovalCommand::Reject {
            reason: "Ticket count mismatch".into(),
        }));
        assert!(matches!(out, ApprovalOutcome::Rejected(r) if r == "Ticket count mismatch"));
    }

    #[test]
    fn approved_submission_cannot_be_approved_again() {
        let mut svc = service();
        svc.execute(request(ApprovalCommand::Approve { comment: None }));
        let out = svc.execute(request(ApprovalCommand::Approve { comment: None }));
        assert!(matches!(
            out,
            ApprovalOutcome::Failed(LedgerError::InvalidTransition { action: "approve", .. })
        ));
    }

    #[test]
    fn archive_once() {
        let mut svc = service();
        assert!(matches!(
            svc.execute(request(ApprovalCommand::Archive)),
            ApprovalOutcome::Archived
        ));
        assert!(svc.execute(request(ApprovalCommand::Archive)).is_failure());
    }

    #[test]
    fn unknown_submission_fails() {
        let mut svc = service();
        let mut req = request(ApprovalCommand::Archive);
        req.submission_id = "COL-404".into();
        assert!(matches!(
            svc.execute(req),
            ApprovalOutcome::Failed(LedgerError::NotFound(_))
        ));
    }
}
