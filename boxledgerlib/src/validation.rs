//! Non-blocking checks shown next to a generated statement.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    model::{DayStatus, Statement},
    policy::Policy,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    pub details: String,
    pub affected_dates: Vec<NaiveDate>,
    /// Whether someone can act on it, e.g. by chasing a missing submission.
    pub resolvable: bool,
}

impl ValidationIssue {
    fn info(message: &str, details: String) -> Self {
        Self {
            severity: Severity::Info,
            message: message.to_string(),
            details,
            affected_dates: Vec::new(),
            resolvable: false,
        }
    }
}

/// Issues ordered critical first.
pub fn validate_statement(st: &Statement, policy: &Policy) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let missing = st.missing_dates();
    if !missing.is_empty() {
        let n = missing.len();
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            message: format!(
                "Missing collections for {n} day{}",
                if n == 1 { "" } else { "s" }
            ),
            details: "Collections not submitted or not approved for some dates in the selected \
                      period"
                .to_string(),
            affected_dates: missing,
            resolvable: true,
        });
    }

    if st.weekly_summaries.is_some()
        && (st.start_date.weekday() != Weekday::Fri || st.end_date.weekday() != Weekday::Thu)
    {
        issues.push(ValidationIssue::info(
            "Week calculation adjusted",
            "Statement period does not align with Friday-Thursday week boundaries; weeks are \
             counted from the start date"
                .to_string(),
        ));
    }

    issues.push(ValidationIssue::info(
        "AC charges calculated automatically",
        format!(
            "₹{} per ticket deducted as per standard policy",
            policy.ac_charge_per_ticket
        ),
    ));

    if st
        .daily_collections
        .iter()
        .any(|d| d.status == DayStatus::Synthesized)
    {
        issues.push(ValidationIssue::info(
            "Demo data",
            "Figures were synthesized and do not come from exhibitor submissions".to_string(),
        ));
    }

    issues.sort_by_key(|i| i.severity);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::StatementAggregator, catalog::Catalog, config::StatementConfig,
        sources::memory::InMemoryRepository,
    };

    fn statement(start: u32, end: u32) -> Statement {
        let cfg = StatementConfig::new(
            "MOV-2023-001",
            "EXH-001",
            NaiveDate::from_ymd_opt(2023, 12, start).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, end).unwrap(),
        )
        .validate(&Catalog::demo(), &Policy::default())
        .unwrap();
        StatementAggregator::default().generate(&cfg, &InMemoryRepository::new())
    }

    #[test]
    fn empty_repository_reports_every_day_missing() {
        let st = statement(1, 7);
        let issues = validate_statement(&st, &Policy::default());
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].message, "Missing collections for 7 days");
        assert_eq!(issues[0].affected_dates.len(), 7);
        assert!(issues[0].resolvable);
    }

    #[test]
    fn friday_to_thursday_needs_no_week_notice() {
        // 2023-12-01 is a Friday, 2023-12-07 a Thursday.
        let aligned = validate_statement(&statement(1, 7), &Policy::default());
        assert!(!aligned.iter().any(|i| i.message == "Week calculation adjusted"));

        let shifted = validate_statement(&statement(2, 8), &Policy::default());
        assert!(shifted.iter().any(|i| i.message == "Week calculation adjusted"));
    }
}
