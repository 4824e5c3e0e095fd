//! Closing statement generation: day-wise breakdown, weekly chunks, totals
//! and the distributor/exhibitor split.

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    config::ValidatedConfig,
    model::{DailyCollectionRecord, ShareSplit, Statement, Totals, WeeklySummary},
    policy::Policy,
    traits::CollectionSource,
};

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementAggregator {
    policy: Policy,
}

impl StatementAggregator {
    pub const fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Builds the statement for `config` from `source`.
    ///
    /// Days the source has nothing for are kept as zero-valued entries
    /// flagged missing, so the day sequence never has gaps.
    pub fn generate<S>(&self, config: &ValidatedConfig, source: &S) -> Statement
    where
        S: CollectionSource + ?Sized,
    {
        let range = config.range();
        let movie_id = config.movie().id.as_str();
        let exhibitor_id = config.exhibitor().id.as_str();

        let mut daily = Vec::with_capacity(range.len_days());
        let mut totals = Totals::default();

        for date in range.days() {
            let day = match source.fetch_day(date, movie_id, exhibitor_id) {
                Some(rec) => rec.rederive(date, self.policy.ac_charge_per_ticket),
                None => {
                    warn!(%date, movie_id, exhibitor_id, "no approved collection for day");
                    DailyCollectionRecord::missing(date)
                }
            };
            totals.add(&day);
            daily.push(day);
        }

        let weekly_summaries = config
            .include_weekly_summary()
            .then(|| weekly_summaries(&daily));
        let share = ShareSplit::compute(totals.total_net, self.policy.distributor_share_percent);

        debug!(
            movie_id,
            exhibitor_id,
            days = daily.len(),
            total_net = totals.total_net,
            "statement generated"
        );

        Statement {
            statement_number: statement_number(config),
            movie: config.movie().clone(),
            exhibitor: config.exhibitor().clone(),
            start_date: range.start,
            end_date: range.end,
            template: config.template(),
            include_gst_details: config.include_gst_details(),
            daily_collections: daily,
            weekly_summaries,
            totals,
            share,
        }
    }
}

/// Splits the day sequence into consecutive 7-day chunks starting at the
/// first day. Chunks follow position in the range, not the weekday.
pub fn weekly_summaries(days: &[DailyCollectionRecord]) -> Vec<WeeklySummary> {
    days.chunks(DAYS_PER_WEEK)
        .zip(1u32..)
        .filter_map(|(chunk, week_number)| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            let net_collection: i64 = chunk.iter().map(|d| d.net_collection).sum();
            let day_count = u32::try_from(chunk.len()).ok()?;
            let average_per_day =
                (Decimal::from(net_collection) / Decimal::from(day_count)).round_dp(2);
            Some(WeeklySummary {
                week_number,
                period_start: first.date,
                period_end: last.date,
                day_count,
                net_collection,
                average_per_day,
            })
        })
        .collect()
}

/// `STMT-<year>-<nnnn>`, stable for the same movie, exhibitor and range.
fn statement_number(config: &ValidatedConfig) -> String {
    let range = config.range();
    let key = format!(
        "{}|{}|{}|{}",
        config.movie().id,
        config.exhibitor().id,
        range.start,
        range.end
    );
    format!("STMT-{}-{:04}", range.end.year(), xxh3_64(key.as_bytes()) % 10_000)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::DayStatus;

    fn days(n: u32, net: i64) -> Vec<DailyCollectionRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        start
            .iter_days()
            .take(n as usize)
            .map(|d| DailyCollectionRecord::new(d, 4, 0, net, 5, DayStatus::Reported))
            .collect()
    }

    #[test]
    fn ten_days_make_two_weeks() {
        let w = weekly_summaries(&days(10, 1_000));
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].week_number, 1);
        assert_eq!(w[0].day_count, 7);
        assert_eq!(w[0].net_collection, 7_000);
        assert_eq!(w[1].week_number, 2);
        assert_eq!(w[1].day_count, 3);
        assert_eq!(w[1].period_start, NaiveDate::from_ymd_opt(2023, 12, 8).unwrap());
        assert_eq!(w[1].period_end, NaiveDate::from_ymd_opt(2023, 12, 10).unwrap());
    }

    #[test]
    fn average_is_rounded_to_paise() {
        let mut d = days(3, 0);
        d[0].net_collection = 100;
        let w = weekly_summaries(&d);
        assert_eq!(w[0].average_per_day, Decimal::new(3333, 2));
    }

    #[test]
    fn empty_sequence_has_no_weeks() {
        assert!(weekly_summaries(&[]).is_empty());
    }
}
