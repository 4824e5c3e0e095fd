//! Seams between the aggregator, its record sources and the writers.

use std::io::{BufRead, Write};

use chrono::NaiveDate;

use crate::{
    error::Result,
    model::{DailyCollectionRecord, Statement},
    submission::{CollectionSubmission, SubmissionStatus},
};

/// Yields one day of collections for a movie at an exhibitor, or `None`
/// when nothing usable exists for that day.
pub trait CollectionSource {
    fn fetch_day(
        &self,
        date: NaiveDate,
        movie_id: &str,
        exhibitor_id: &str,
    ) -> Option<DailyCollectionRecord>;
}

/// Filters for listing submissions; `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub movie_id: Option<String>,
    pub exhibitor_id: Option<String>,
    pub status: Option<SubmissionStatus>,
}

impl SubmissionFilter {
    pub fn matches(&self, s: &CollectionSubmission) -> bool {
        self.date_from.is_none_or(|d| s.date >= d)
            && self.date_to.is_none_or(|d| s.date <= d)
            && self.movie_id.as_deref().is_none_or(|m| s.movie_id == m)
            && self.exhibitor_id.as_deref().is_none_or(|e| s.exhibitor_id == e)
            && self.status.is_none_or(|st| s.status == st)
    }
}

/// Store of exhibitor submissions.
pub trait CollectionRecordRepository {
    fn insert(&mut self, submission: CollectionSubmission) -> Result<()>;
    fn get(&self, id: &str) -> Option<&CollectionSubmission>;
    fn update(&mut self, submission: CollectionSubmission) -> Result<()>;
    fn list(&self, filter: &SubmissionFilter) -> Vec<&CollectionSubmission>;
}

pub trait ReadFormat {
    fn read<R: BufRead>(r: R) -> Result<Vec<CollectionSubmission>>;
}

pub trait WriteFormat {
    fn write<W: Write>(w: W, st: &Statement) -> Result<()>;
}

pub trait Format: ReadFormat + WriteFormat {}
impl<T: ReadFormat + WriteFormat> Format for T {}
