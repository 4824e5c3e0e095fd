//! Domain models shared by sources, the aggregator and the writers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Whole rupees. Collections never carry paise.
pub type Rupees = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Backed by an approved exhibitor submission.
    Reported,
    /// Filled in by the demo source.
    Synthesized,
    /// Nothing approved for that day; all amounts are zero.
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCollectionRecord {
    pub date: NaiveDate,
    pub show_count: u32,
    pub tickets_sold: u32,
    pub gross_collection: Rupees,
    pub ac_charges: Rupees,
    pub net_collection: Rupees,
    pub status: DayStatus,
}

impl DailyCollectionRecord {
    /// Builds a record and derives AC charges and net from tickets and gross.
    pub fn new(
        date: NaiveDate,
        show_count: u32,
        tickets_sold: u32,
        gross_collection: Rupees,
        ac_charge_per_ticket: Rupees,
        status: DayStatus,
    ) -> Self {
        let ac_charges = Rupees::from(tickets_sold) * ac_charge_per_ticket;
        Self {
            date,
            show_count,
            tickets_sold,
            gross_collection,
            ac_charges,
            net_collection: gross_collection - ac_charges,
            status,
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self::new(date, 0, 0, 0, 0, DayStatus::Missing)
    }

    /// Same record with AC charges and net recomputed under `ac_charge_per_ticket`.
    pub fn rederive(&self, date: NaiveDate, ac_charge_per_ticket: Rupees) -> Self {
        Self::new(
            date,
            self.show_count,
            self.tickets_sold,
            self.gross_collection,
            ac_charge_per_ticket,
            self.status,
        )
    }

    pub fn day_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    pub fn is_missing(&self) -> bool {
        self.status == DayStatus::Missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklySummary {
    pub week_number: u32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub day_count: u32,
    pub net_collection: Rupees,
    pub average_per_day: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieInfo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExhibitorStatus {
    #[default]
    Active,
    Inactive,
}

impl ExhibitorStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ExhibitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExhibitorInfo {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub gst_number: Option<String>,
    #[serde(default)]
    pub status: ExhibitorStatus,
}

impl ExhibitorInfo {
    pub fn is_active(&self) -> bool {
        self.status == ExhibitorStatus::Active
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Totals {
    pub total_shows: u64,
    pub total_tickets: u64,
    pub total_gross: Rupees,
    pub total_ac_charges: Rupees,
    pub total_net: Rupees,
}

impl Totals {
    pub fn add(&mut self, day: &DailyCollectionRecord) {
        self.total_shows += u64::from(day.show_count);
        self.total_tickets += u64::from(day.tickets_sold);
        self.total_gross += day.gross_collection;
        self.total_ac_charges += day.ac_charges;
        self.total_net += day.net_collection;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareSplit {
    pub distributor_percent: u8,
    pub exhibitor_percent: u8,
    pub distributor_share: Rupees,
    pub exhibitor_share: Rupees,
}

impl ShareSplit {
    /// Integer division on each side; the remainder stays unallocated.
    pub fn compute(total_net: Rupees, distributor_percent: u8) -> Self {
        let exhibitor_percent = 100u8.saturating_sub(distributor_percent);
        Self {
            distributor_percent,
            exhibitor_percent,
            distributor_share: total_net * Rupees::from(distributor_percent) / 100,
            exhibitor_share: total_net * Rupees::from(exhibitor_percent) / 100,
        }
    }

    /// What the two shares leave out of `total_net` after rounding.
    pub const fn remainder(&self, total_net: Rupees) -> Rupees {
        total_net - self.distributor_share - self.exhibitor_share
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    /// Day-wise breakdown with weekly summaries.
    #[default]
    Standard,
    /// Show-wise breakdown with AC charges.
    Detailed,
    /// Weekly totals only.
    Summary,
    /// Share split and per-day performance for producers.
    Producer,
}

impl TemplateFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Detailed => "detailed",
            Self::Summary => "summary",
            Self::Producer => "producer",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "detailed" => Ok(Self::Detailed),
            "summary" => Ok(Self::Summary),
            "producer" => Ok(Self::Producer),
            other => Err(LedgerError::Parse(format!("unknown template: {other}"))),
        }
    }
}

/// A generated closing statement. Built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statement {
    pub statement_number: String,
    pub movie: MovieInfo,
    pub exhibitor: ExhibitorInfo,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub template: TemplateFormat,
    pub include_gst_details: bool,
    pub daily_collections: Vec<DailyCollectionRecord>,
    pub weekly_summaries: Option<Vec<WeeklySummary>>,
    pub totals: Totals,
    pub share: ShareSplit,
}

impl Statement {
    pub fn missing_dates(&self) -> Vec<NaiveDate> {
        self.daily_collections
            .iter()
            .filter(|d| d.is_missing())
            .map(|d| d.date)
            .collect()
    }

    pub fn day_count(&self) -> usize {
        self.daily_collections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, d).unwrap()
    }

    #[test]
    fn record_derives_ac_and_net() {
        let r = DailyCollectionRecord::new(date(1), 4, 500, 100_000, 5, DayStatus::Reported);
        assert_eq!(r.ac_charges, 2_500);
        assert_eq!(r.net_collection, 97_500);
        assert_eq!(r.day_name(), "Friday");
    }

    #[test]
    fn missing_day_is_zeroed_and_flagged() {
        let r = DailyCollectionRecord::missing(date(5));
        assert!(r.is_missing());
        assert_eq!(r.gross_collection, 0);
        assert_eq!(r.net_collection, 0);
    }

    #[test]
    fn share_split_leaves_remainder() {
        let s = ShareSplit::compute(1_001, 60);
        assert_eq!(s.distributor_share, 600);
        assert_eq!(s.exhibitor_share, 400);
        assert_eq!(s.remainder(1_001), 1);

        let even = ShareSplit::compute(682_500, 60);
        assert_eq!(even.distributor_share, 409_500);
        assert_eq!(even.exhibitor_share, 273_000);
        assert_eq!(even.remainder(682_500), 0);
    }

    #[test]
    fn template_parses_case_insensitively() {
        assert_eq!("Detailed".parse::<TemplateFormat>().unwrap(), TemplateFormat::Detailed);
        assert!("fancy".parse::<TemplateFormat>().is_err());
    }
}
