//! Deterministic synthetic collections for demo mode.
//!
//! Every day is derived from an xxh3 hash of `(movie, exhibitor, date)`, so
//! the same request always produces the same figures. Records are tagged
//! [`DayStatus::Synthesized`] and never pass for real submissions.

use chrono::NaiveDate;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::{
    model::{DailyCollectionRecord, DayStatus, Rupees},
    policy::AC_CHARGE_PER_TICKET,
    traits::CollectionSource,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCollectionSource {
    seed: u64,
}

impl DemoCollectionSource {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn entropy(&self, date: NaiveDate, movie_id: &str, exhibitor_id: &str) -> u64 {
        let key = format!("{movie_id}|{exhibitor_id}|{}", date.format("%Y-%m-%d"));
        xxh3_64_with_seed(key.as_bytes(), self.seed)
    }
}

impl CollectionSource for DemoCollectionSource {
    fn fetch_day(
        &self,
        date: NaiveDate,
        movie_id: &str,
        exhibitor_id: &str,
    ) -> Option<DailyCollectionRecord> {
        let h = self.entropy(date, movie_id, exhibitor_id);

        // 3..=4 shows, 200..=699 tickets, ₹150..=249 a ticket.
        let shows = 3 + (h % 2) as u32;
        let tickets = 200 + ((h >> 8) % 500) as u32;
        let price = 150 + ((h >> 24) % 100) as Rupees;

        Some(DailyCollectionRecord::new(
            date,
            shows,
            tickets,
            Rupees::from(tickets) * price,
            AC_CHARGE_PER_TICKET,
            DayStatus::Synthesized,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_day() {
        let src = DemoCollectionSource::new(7);
        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let a = src.fetch_day(date, "MOV-2023-001", "EXH-001");
        let b = src.fetch_day(date, "MOV-2023-001", "EXH-001");
        assert_eq!(a, b);
    }

    #[test]
    fn figures_stay_in_policy_ranges() {
        let src = DemoCollectionSource::default();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        for date in start.iter_days().take(365) {
            let day = src.fetch_day(date, "MOV-2023-003", "EXH-004").unwrap();
            assert!((3..=4).contains(&day.show_count));
            assert!((200..=699).contains(&day.tickets_sold));
            let tickets = Rupees::from(day.tickets_sold);
            assert!(day.gross_collection >= tickets * 150);
            assert!(day.gross_collection <= tickets * 249);
            assert_eq!(day.status, DayStatus::Synthesized);
        }
    }
}
