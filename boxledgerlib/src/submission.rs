//! Daily collection submissions entered by exhibitors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{FieldErrors, LedgerError, Result},
    model::{DailyCollectionRecord, DayStatus, Rupees},
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
    Archived,
}

impl SubmissionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" | "" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "archived" => Ok(Self::Archived),
            other => Err(LedgerError::Parse(format!("unknown status: {other}"))),
        }
    }
}

/// Shows, tickets and takings for one show slot of the day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowSlot {
    pub shows: u32,
    pub tickets: u32,
    pub gross: Rupees,
}

impl ShowSlot {
    pub const fn new(shows: u32, tickets: u32, gross: Rupees) -> Self {
        Self {
            shows,
            tickets,
            gross,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.shows == 0 && self.tickets == 0 && self.gross == 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowBreakdown {
    pub matinee: ShowSlot,
    pub afternoon: ShowSlot,
    pub first_show: ShowSlot,
    pub second_show: ShowSlot,
}

impl ShowBreakdown {
    pub const fn slots(&self) -> [ShowSlot; 4] {
        [self.matinee, self.afternoon, self.first_show, self.second_show]
    }

    /// `None` when the slots do not fit a day record.
    pub fn total_shows(&self) -> Option<u32> {
        self.slots().iter().try_fold(0u32, |acc, s| acc.checked_add(s.shows))
    }

    pub fn total_tickets(&self) -> Option<u32> {
        self.slots().iter().try_fold(0u32, |acc, s| acc.checked_add(s.tickets))
    }

    pub fn total_gross(&self) -> Option<Rupees> {
        self.slots().iter().try_fold(0, |acc: Rupees, s| acc.checked_add(s.gross))
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(ShowSlot::is_empty)
    }
}

/// Review trail of a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSubmission {
    pub id: String,
    pub movie_id: String,
    pub exhibitor_id: String,
    pub date: NaiveDate,
    pub shows: ShowBreakdown,
    pub submitted_by: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub status: SubmissionStatus,
    pub review: Review,
}

impl CollectionSubmission {
    pub fn new(id: &str, movie_id: &str, exhibitor_id: &str, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            movie_id: movie_id.to_string(),
            exhibitor_id: exhibitor_id.to_string(),
            date,
            shows: ShowBreakdown::default(),
            submitted_by: String::new(),
            submitted_at: None,
            remarks: None,
            status: SubmissionStatus::Pending,
            review: Review::default(),
        }
    }

    /// Form checks run before a submission is accepted. Drafts may be saved
    /// without any show data.
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.movie_id.trim().is_empty() {
            errors.push("movie_id", "Please select a movie");
        }
        if self.exhibitor_id.trim().is_empty() {
            errors.push("exhibitor_id", "Exhibitor is required");
        }
        if self.status != SubmissionStatus::Draft && self.shows.is_empty() {
            errors.push("general", "Please enter at least one show collection");
        }
        if self.shows.slots().iter().any(|s| s.gross < 0) {
            errors.push("general", "Collection amounts cannot be negative");
        }
        if self.shows.total_shows().is_none() {
            errors.push("shows", "Show count too large");
        }
        if self.shows.total_tickets().is_none() {
            errors.push("tickets", "Ticket count too large");
        }
        if self.shows.total_gross().is_none() {
            errors.push("gross", "Collection amount too large");
        }
        errors.into_result()
    }

    /// Day record for the aggregator, summed over the show slots. Fails with
    /// the same field errors as [`validate`](Self::validate) when a total
    /// overflows.
    pub fn to_daily_record(&self, ac_charge_per_ticket: Rupees) -> Result<DailyCollectionRecord> {
        match (
            self.shows.total_shows(),
            self.shows.total_tickets(),
            self.shows.total_gross(),
        ) {
            (Some(shows), Some(tickets), Some(gross)) => Ok(DailyCollectionRecord::new(
                self.date,
                shows,
                tickets,
                gross,
                ac_charge_per_ticket,
                DayStatus::Reported,
            )),
            _ => {
                self.validate()?;
                Err(LedgerError::Parse(format!("{}: totals out of range", self.id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CollectionSubmission {
        let mut s = CollectionSubmission::new(
            "COL-2023-001",
            "MOV-2023-001",
            "EXH-001",
            NaiveDate::from_ymd_opt(2023, 12, 12).unwrap(),
        );
        s.shows = ShowBreakdown {
            matinee: ShowSlot::new(1, 175, 45_000),
            afternoon: ShowSlot::new(1, 230, 65_000),
            first_show: ShowSlot::new(1, 285, 85_000),
            second_show: ShowSlot::new(1, 200, 50_000),
        };
        s
    }

    #[test]
    fn daily_record_sums_slots() {
        let r = sample().to_daily_record(5).unwrap();
        assert_eq!(r.show_count, 4);
        assert_eq!(r.tickets_sold, 890);
        assert_eq!(r.gross_collection, 245_000);
        assert_eq!(r.ac_charges, 4_450);
        assert_eq!(r.net_collection, 240_550);
        assert_eq!(r.status, DayStatus::Reported);
    }

    #[test]
    fn empty_submission_needs_show_data_unless_draft() {
        let mut s = CollectionSubmission::new(
            "COL-X",
            "MOV-2023-001",
            "EXH-001",
            NaiveDate::from_ymd_opt(2023, 12, 12).unwrap(),
        );
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("at least one show"));

        s.status = SubmissionStatus::Draft;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn status_parses_from_csv_text() {
        assert_eq!("Approved".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Approved);
        assert_eq!("".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Pending);
        assert!("lost".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn slot_totals_that_overflow_are_rejected() {
        let mut s = sample();
        s.shows.matinee.tickets = 3_000_000_000;
        s.shows.afternoon.tickets = 3_000_000_000;
        s.status = SubmissionStatus::Approved;

        assert_eq!(s.shows.total_tickets(), None);
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("Ticket count too large"));
        assert!(s.to_daily_record(5).is_err());

        s.shows.afternoon.tickets = 230;
        s.shows.first_show.gross = i64::MAX;
        assert!(s.validate().unwrap_err().to_string().contains("Collection amount too large"));
    }
}
