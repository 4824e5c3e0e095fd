//! In-memory submission store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    error::{LedgerError, Result},
    model::DailyCollectionRecord,
    policy::AC_CHARGE_PER_TICKET,
    submission::{CollectionSubmission, SubmissionStatus},
    traits::{CollectionRecordRepository, CollectionSource, SubmissionFilter},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    submissions: BTreeMap<String, CollectionSubmission>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads submissions, rejecting the batch on the first invalid or
    /// duplicate entry.
    pub fn with_submissions(items: impl IntoIterator<Item = CollectionSubmission>) -> Result<Self> {
        let mut repo = Self::new();
        for s in items {
            repo.insert(s)?;
        }
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// All submissions ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &CollectionSubmission> {
        self.submissions.values()
    }
}

impl CollectionRecordRepository for InMemoryRepository {
    fn insert(&mut self, submission: CollectionSubmission) -> Result<()> {
        submission.validate()?;
        if self.submissions.contains_key(&submission.id) {
            return Err(LedgerError::Duplicate(submission.id));
        }
        debug!(id = %submission.id, date = %submission.date, "submission stored");
        self.submissions.insert(submission.id.clone(), submission);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<&CollectionSubmission> {
        self.submissions.get(id)
    }

    fn update(&mut self, submission: CollectionSubmission) -> Result<()> {
        match self.submissions.get_mut(&submission.id) {
            Some(slot) => {
                *slot = submission;
                Ok(())
            }
            None => Err(LedgerError::NotFound(submission.id)),
        }
    }

    fn list(&self, filter: &SubmissionFilter) -> Vec<&CollectionSubmission> {
        self.submissions.values().filter(|s| filter.matches(s)).collect()
    }
}

impl CollectionSource for InMemoryRepository {
    /// Only approved submissions count. When a day was approved more than
    /// once, the most recently reviewed one wins.
    fn fetch_day(
        &self,
        date: NaiveDate,
        movie_id: &str,
        exhibitor_id: &str,
    ) -> Option<DailyCollectionRecord> {
        self.submissions
            .values()
            .filter(|s| {
                s.status == SubmissionStatus::Approved
                    && s.date == date
                    && s.movie_id == movie_id
                    && s.exhibitor_id == exhibitor_id
            })
            .max_by(|a, b| {
                a.review
                    .reviewed_at
                    .cmp(&b.review.reviewed_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .and_then(|s| match s.to_daily_record(AC_CHARGE_PER_TICKET) {
                Ok(rec) => Some(rec),
                Err(e) => {
                    warn!(id = %s.id, error = %e, "approved submission skipped");
                    None
                }
            })
    }
}
