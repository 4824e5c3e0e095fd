//! CSV in both directions.
//!
//! Reading takes exhibitor submissions, one row per submission:
//! id,movie_id,exhibitor_id,date,matinee_shows,matinee_tickets,matinee_gross,
//! afternoon_*,first_*,second_*,submitted_by,submitted_at,status,reviewed_by,
//! reviewed_at,review_comment,remarks
//!
//! Writing emits a statement, one row per day.

use std::io::{BufRead, Write};

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::DAYS_PER_WEEK,
    error::{LedgerError, Result},
    model::{DayStatus, Rupees, Statement},
    submission::{CollectionSubmission, Review, ShowBreakdown, ShowSlot},
};

#[derive(Deserialize, Serialize)]
struct SubmissionRow {
    id: String,
    movie_id: String,
    exhibitor_id: String,
    date: String,
    matinee_shows: Option<u32>,
    matinee_tickets: Option<u32>,
    matinee_gross: Option<Rupees>,
    afternoon_shows: Option<u32>,
    afternoon_tickets: Option<u32>,
    afternoon_gross: Option<Rupees>,
    first_shows: Option<u32>,
    first_tickets: Option<u32>,
    first_gross: Option<Rupees>,
    second_shows: Option<u32>,
    second_tickets: Option<u32>,
    second_gross: Option<Rupees>,
    submitted_by: Option<String>,
    submitted_at: Option<String>,
    status: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<String>,
    review_comment: Option<String>,
    remarks: Option<String>,
}

#[derive(Serialize)]
struct StatementRow<'a> {
    statement_number: &'a str,
    movie_id: &'a str,
    exhibitor_id: &'a str,
    week_number: Option<usize>,
    date: String,
    day: String,
    status: &'static str,
    shows: u32,
    tickets: u32,
    gross: Rupees,
    ac_charges: Rupees,
    net: Rupees,
}

fn slot(shows: Option<u32>, tickets: Option<u32>, gross: Option<Rupees>) -> ShowSlot {
    ShowSlot::new(
        shows.unwrap_or_default(),
        tickets.unwrap_or_default(),
        gross.unwrap_or_default(),
    )
}

fn parse_timestamp(field: &str, v: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match v.filter(|s| !s.trim().is_empty()) {
        Some(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| LedgerError::Parse(format!("{field}: {e}"))),
        None => Ok(None),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

const fn day_status(s: DayStatus) -> &'static str {
    match s {
        DayStatus::Reported => "reported",
        DayStatus::Synthesized => "synthesized",
        DayStatus::Missing => "missing",
    }
}

pub struct Csv;

impl Csv {
    /// Writes submissions back in the same layout [`ReadFormat::read`] takes.
    ///
    /// [`ReadFormat::read`]: crate::traits::ReadFormat::read
    pub fn write_submissions<'a, W: Write>(
        w: W,
        items: impl IntoIterator<Item = &'a CollectionSubmission>,
    ) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(w);
        for s in items {
            let [m, a, f, sc] = s.shows.slots();
            wrt.serialize(SubmissionRow {
                id: s.id.clone(),
                movie_id: s.movie_id.clone(),
                exhibitor_id: s.exhibitor_id.clone(),
                date: s.date.format("%Y-%m-%d").to_string(),
                matinee_shows: Some(m.shows),
                matinee_tickets: Some(m.tickets),
                matinee_gross: Some(m.gross),
                afternoon_shows: Some(a.shows),
                afternoon_tickets: Some(a.tickets),
                afternoon_gross: Some(a.gross),
                first_shows: Some(f.shows),
                first_tickets: Some(f.tickets),
                first_gross: Some(f.gross),
                second_shows: Some(sc.shows),
                second_tickets: Some(sc.tickets),
                second_gross: Some(sc.gross),
                submitted_by: Some(s.submitted_by.clone()),
                submitted_at: s.submitted_at.map(|t| t.to_rfc3339()),
                status: Some(s.status.to_string()),
                reviewed_by: s.review.reviewed_by.clone(),
                reviewed_at: s.review.reviewed_at.map(|t| t.to_rfc3339()),
                review_comment: s.review.comment.clone(),
                remarks: s.remarks.clone(),
            })?;
        }
        wrt.flush()?;
        Ok(())
    }
}

impl crate::traits::ReadFormat for Csv {
    fn read<R: BufRead>(r: R) -> Result<Vec<CollectionSubmission>> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(r);
        let mut out = Vec::new();

        for rec in rdr.deserialize::<SubmissionRow>() {
            let row = rec?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|e| LedgerError::Parse(format!("{}: date: {e}", row.id)))?;

            let mut s = CollectionSubmission::new(&row.id, &row.movie_id, &row.exhibitor_id, date);
            s.shows = ShowBreakdown {
                matinee: slot(row.matinee_shows, row.matinee_tickets, row.matinee_gross),
                afternoon: slot(row.afternoon_shows, row.afternoon_tickets, row.afternoon_gross),
                first_show: slot(row.first_shows, row.first_tickets, row.first_gross),
                second_show: slot(row.second_shows, row.second_tickets, row.second_gross),
            };
            s.submitted_by = row.submitted_by.unwrap_or_default();
            s.submitted_at = parse_timestamp("submitted_at", row.submitted_at)?;
            s.status = row.status.as_deref().unwrap_or_default().parse()?;
            s.review = Review {
                reviewed_by: non_empty(row.reviewed_by),
                reviewed_at: parse_timestamp("reviewed_at", row.reviewed_at)?,
                comment: non_empty(row.review_comment),
            };
            s.remarks = non_empty(row.remarks);
            out.push(s);
        }

        Ok(out)
    }
}

impl crate::traits::WriteFormat for Csv {
    fn write<W: Write>(mut w: W, st: &Statement) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(&mut w);
        let weekly = st.weekly_summaries.is_some();

        for (i, d) in st.daily_collections.iter().enumerate() {
            wrt.serialize(StatementRow {
                statement_number: &st.statement_number,
                movie_id: &st.movie.id,
                exhibitor_id: &st.exhibitor.id,
                week_number: weekly.then_some(i / DAYS_PER_WEEK + 1),
                date: d.date.format("%Y-%m-%d").to_string(),
                day: d.day_name(),
                status: day_status(d.status),
                shows: d.show_count,
                tickets: d.tickets_sold,
                gross: d.gross_collection,
                ac_charges: d.ac_charges,
                net: d.net_collection,
            })?;
        }
        wrt.flush()?;
        Ok(())
    }
}
