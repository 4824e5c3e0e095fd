//! Statement request configuration and its validation.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    error::{FieldErrors, LedgerError, Result},
    model::{ExhibitorInfo, MovieInfo, TemplateFormat},
    policy::Policy,
};

/// Raw request, as filled in by a form or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementConfig {
    pub movie_id: String,
    pub exhibitor_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub template: TemplateFormat,
    pub include_weekly_summary: bool,
    pub include_gst_details: bool,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            movie_id: String::new(),
            exhibitor_id: String::new(),
            start_date: None,
            end_date: None,
            template: TemplateFormat::Standard,
            include_weekly_summary: true,
            include_gst_details: true,
        }
    }
}

impl StatementConfig {
    pub fn new(movie_id: &str, exhibitor_id: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            movie_id: movie_id.to_string(),
            exhibitor_id: exhibitor_id.to_string(),
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    /// Checks every field and resolves the ids against `catalog`.
    ///
    /// All problems are collected before returning so the caller can show
    /// them next to their fields at once.
    pub fn validate(&self, catalog: &Catalog, policy: &Policy) -> Result<ValidatedConfig> {
        let mut errors = FieldErrors::default();

        let movie = if self.movie_id.trim().is_empty() {
            errors.set("movie_id", "Please select a movie");
            None
        } else {
            let m = catalog.movie(self.movie_id.trim());
            if m.is_none() {
                errors.set("movie_id", format!("Unknown movie: {}", self.movie_id));
            }
            m
        };

        let exhibitor = if self.exhibitor_id.trim().is_empty() {
            errors.set("exhibitor_id", "Please select an exhibitor");
            None
        } else {
            match catalog.exhibitor(self.exhibitor_id.trim()) {
                None => {
                    errors.set(
                        "exhibitor_id",
                        format!("Unknown exhibitor: {}", self.exhibitor_id),
                    );
                    None
                }
                Some(e) if !e.is_active() => {
                    errors.set("exhibitor_id", format!("Exhibitor {} is inactive", e.id));
                    None
                }
                Some(e) => Some(e),
            }
        };

        if self.start_date.is_none() {
            errors.set("start_date", "Start date is required");
        }
        if self.end_date.is_none() {
            errors.set("end_date", "End date is required");
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.set("end_date", "End date must be after start date");
            }
            if (end - start).num_days() > policy.max_range_days {
                errors.set(
                    "end_date",
                    format!("Date range cannot exceed {} days", policy.max_range_days),
                );
            }
        }

        match (movie, exhibitor, self.start_date, self.end_date) {
            (Some(movie), Some(exhibitor), Some(start), Some(end)) if errors.is_empty() => {
                Ok(ValidatedConfig {
                    movie: movie.clone(),
                    exhibitor: exhibitor.clone(),
                    range: DateRange { start, end },
                    template: self.template,
                    include_weekly_summary: self.include_weekly_summary,
                    include_gst_details: self.include_gst_details,
                })
            }
            _ => Err(LedgerError::Config(errors)),
        }
    }
}

/// Inclusive, non-empty date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len_days())
    }
}

/// A request that passed [`StatementConfig::validate`]. Only validation can
/// build one, so the aggregator never sees an inverted or oversized range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    movie: MovieInfo,
    exhibitor: ExhibitorInfo,
    range: DateRange,
    template: TemplateFormat,
    include_weekly_summary: bool,
    include_gst_details: bool,
}

impl ValidatedConfig {
    pub const fn movie(&self) -> &MovieInfo {
        &self.movie
    }

    pub const fn exhibitor(&self) -> &ExhibitorInfo {
        &self.exhibitor
    }

    pub const fn range(&self) -> DateRange {
        self.range
    }

    pub const fn template(&self) -> TemplateFormat {
        self.template
    }

    pub const fn include_weekly_summary(&self) -> bool {
        self.include_weekly_summary
    }

    pub const fn include_gst_details(&self) -> bool {
        self.include_gst_details
    }
}

/// Shortcut ranges offered next to the date pickers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuickRange {
    /// From the most recent Friday up to today.
    ThisWeek,
    /// The seven days before today, up to today.
    LastWeek,
    ThisMonth,
    /// The whole previous calendar month, ending on its last day rather
    /// than on today, so it never overlaps `ThisMonth`.
    LastMonth,
}

impl QuickRange {
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        match self {
            Self::ThisWeek => {
                // Friday is 4 days from Monday.
                let since_friday = (today.weekday().num_days_from_monday() + 3) % 7;
                DateRange {
                    start: today - Duration::days(i64::from(since_friday)),
                    end: today,
                }
            }
            Self::LastWeek => DateRange {
                start: today - Duration::days(7),
                end: today,
            },
            Self::ThisMonth => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            },
            Self::LastMonth => {
                let first_this = today.with_day(1).unwrap_or(today);
                let last_prev = first_this.pred_opt().unwrap_or(first_this);
                DateRange {
                    start: last_prev.with_day(1).unwrap_or(last_prev),
                    end: last_prev,
                }
            }
        }
    }
}

impl FromStr for QuickRange {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "this-week" => Ok(Self::ThisWeek),
            "last-week" => Ok(Self::LastWeek),
            "this-month" => Ok(Self::ThisMonth),
            "last-month" => Ok(Self::LastMonth),
            other => Err(LedgerError::Parse(format!("unknown range: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogCommand;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn errors_of(cfg: &StatementConfig) -> FieldErrors {
        match cfg.validate(&Catalog::demo(), &Policy::default()) {
            Err(LedgerError::Config(e)) => e,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_reports_every_field() {
        let e = errors_of(&StatementConfig::default());
        assert_eq!(e.get("movie_id"), Some("Please select a movie"));
        assert_eq!(e.get("exhibitor_id"), Some("Please select an exhibitor"));
        assert_eq!(e.get("start_date"), Some("Start date is required"));
        assert_eq!(e.get("end_date"), Some("End date is required"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cfg = StatementConfig::new("MOV-2023-001", "EXH-001", d(2023, 12, 7), d(2023, 12, 1));
        let e = errors_of(&cfg);
        assert_eq!(e.get("end_date"), Some("End date must be after start date"));
    }

    #[test]
    fn span_limit_counts_end_minus_start() {
        let start = d(2023, 10, 1);
        let ok = StatementConfig::new("MOV-2023-001", "EXH-001", start, start + Duration::days(90));
        assert!(ok.validate(&Catalog::demo(), &Policy::default()).is_ok());

        let too_long =
            StatementConfig::new("MOV-2023-001", "EXH-001", start, start + Duration::days(91));
        let e = errors_of(&too_long);
        assert_eq!(e.get("end_date"), Some("Date range cannot exceed 90 days"));
    }

    #[test]
    fn unknown_ids_are_field_errors() {
        let cfg = StatementConfig::new("MOV-9", "EXH-9", d(2023, 12, 1), d(2023, 12, 2));
        let e = errors_of(&cfg);
        assert_eq!(e.get("movie_id"), Some("Unknown movie: MOV-9"));
        assert_eq!(e.get("exhibitor_id"), Some("Unknown exhibitor: EXH-9"));
    }

    #[test]
    fn validated_config_resolves_catalog_entries() {
        let cfg = StatementConfig::new("MOV-2023-002", "EXH-003", d(2023, 12, 1), d(2023, 12, 10));
        let v = cfg.validate(&Catalog::demo(), &Policy::default()).unwrap();
        assert_eq!(v.movie().title, "Jawan");
        assert_eq!(v.exhibitor().gst_number.as_deref(), Some("29AAACP9012C1Z3"));
        assert_eq!(v.range().len_days(), 10);
        assert_eq!(v.range().days().last(), Some(d(2023, 12, 10)));
    }

    #[test]
    fn this_week_starts_on_friday() {
        // 2023-12-12 is a Tuesday.
        let r = QuickRange::ThisWeek.resolve(d(2023, 12, 12));
        assert_eq!(r.start, d(2023, 12, 8));
        assert_eq!(r.end, d(2023, 12, 12));

        let fri = QuickRange::ThisWeek.resolve(d(2023, 12, 8));
        assert_eq!(fri.start, d(2023, 12, 8));
    }

    #[test]
    fn last_month_is_a_full_calendar_month() {
        let r = QuickRange::LastMonth.resolve(d(2024, 3, 15));
        assert_eq!(r.start, d(2024, 2, 1));
        assert_eq!(r.end, d(2024, 2, 29));
    }

    #[test]
    fn inactive_exhibitor_is_refused() {
        let mut catalog = Catalog::demo();
        catalog
            .execute(CatalogCommand::DeactivateExhibitor {
                id: "EXH-004".to_string(),
            })
            .unwrap();
        let cfg = StatementConfig::new("MOV-2023-001", "EXH-004", d(2023, 12, 1), d(2023, 12, 7));
        let err = cfg.validate(&catalog, &Policy::default()).unwrap_err();
        match err {
            LedgerError::Config(e) => {
                assert_eq!(e.get("exhibitor_id"), Some("Exhibitor EXH-004 is inactive"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
