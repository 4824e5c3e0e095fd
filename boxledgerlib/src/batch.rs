//! Statements for every movie × exhibitor pair over one date range.

use tracing::{info, warn};

use crate::{
    aggregate::StatementAggregator,
    catalog::Catalog,
    config::{DateRange, StatementConfig},
    error::{FieldErrors, LedgerError, Result},
    model::{Statement, TemplateFormat},
    traits::CollectionSource,
};

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub movie_ids: Vec<String>,
    pub exhibitor_ids: Vec<String>,
    pub range: DateRange,
    pub template: TemplateFormat,
    pub include_weekly_summary: bool,
    pub include_gst_details: bool,
}

impl BatchRequest {
    fn config_for(&self, movie_id: &str, exhibitor_id: &str) -> StatementConfig {
        StatementConfig {
            template: self.template,
            include_weekly_summary: self.include_weekly_summary,
            include_gst_details: self.include_gst_details,
            ..StatementConfig::new(movie_id, exhibitor_id, self.range.start, self.range.end)
        }
    }
}

#[derive(Debug)]
pub enum BatchStatus {
    Completed(Box<Statement>),
    Failed(LedgerError),
}

#[derive(Debug)]
pub struct BatchItem {
    /// `<movie>-<exhibitor>`.
    pub id: String,
    pub movie_id: String,
    pub exhibitor_id: String,
    pub status: BatchStatus,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, BatchStatus::Completed(_)))
            .count()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.items.iter().filter_map(|i| match &i.status {
            BatchStatus::Completed(st) => Some(st.as_ref()),
            BatchStatus::Failed(_) => None,
        })
    }
}

/// Runs one generation per pair, movies in the outer loop. A pair that fails
/// validation is recorded as failed and does not stop the others.
pub fn generate_batch<S>(
    request: &BatchRequest,
    catalog: &Catalog,
    aggregator: &StatementAggregator,
    source: &S,
) -> Result<BatchReport>
where
    S: CollectionSource + ?Sized,
{
    let mut errors = FieldErrors::default();
    if request.movie_ids.is_empty() {
        errors.push("movie_ids", "Select at least one movie");
    }
    if request.exhibitor_ids.is_empty() {
        errors.push("exhibitor_ids", "Select at least one exhibitor");
    }
    errors.into_result()?;

    let mut report = BatchReport::default();
    for movie_id in &request.movie_ids {
        for exhibitor_id in &request.exhibitor_ids {
            let status = match request
                .config_for(movie_id, exhibitor_id)
                .validate(catalog, aggregator.policy())
            {
                Ok(cfg) => BatchStatus::Completed(Box::new(aggregator.generate(&cfg, source))),
                Err(e) => {
                    warn!(%movie_id, %exhibitor_id, error = %e, "batch item failed");
                    BatchStatus::Failed(e)
                }
            };
            report.items.push(BatchItem {
                id: format!("{movie_id}-{exhibitor_id}"),
                movie_id: movie_id.clone(),
                exhibitor_id: exhibitor_id.clone(),
                status,
            });
        }
    }

    info!(
        completed = report.completed(),
        total = report.total(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::sources::demo::DemoCollectionSource;

    fn request(movies: &[&str], exhibitors: &[&str]) -> BatchRequest {
        BatchRequest {
            movie_ids: movies.iter().map(ToString::to_string).collect(),
            exhibitor_ids: exhibitors.iter().map(ToString::to_string).collect(),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 12, 14).unwrap(),
            },
            template: TemplateFormat::Summary,
            include_weekly_summary: true,
            include_gst_details: false,
        }
    }

    #[test]
    fn cross_product_in_order() {
        let report = generate_batch(
            &request(&["MOV-2023-001", "MOV-2023-002"], &["EXH-001", "EXH-002"]),
            &Catalog::demo(),
            &StatementAggregator::default(),
            &DemoCollectionSource::default(),
        )
        .unwrap();

        let ids: Vec<_> = report.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "MOV-2023-001-EXH-001",
                "MOV-2023-001-EXH-002",
                "MOV-2023-002-EXH-001",
                "MOV-2023-002-EXH-002",
            ]
        );
        assert_eq!(report.completed(), 4);
        assert!(report.statements().all(|s| s.template == TemplateFormat::Summary));
    }

    #[test]
    fn unknown_exhibitor_fails_only_its_items() {
        let report = generate_batch(
            &request(&["MOV-2023-001"], &["EXH-001", "EXH-999"]),
            &Catalog::demo(),
            &StatementAggregator::default(),
            &DemoCollectionSource::default(),
        )
        .unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(report.completed(), 1);
        assert!(matches!(report.items[1].status, BatchStatus::Failed(LedgerError::Config(_))));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = generate_batch(
            &request(&[], &["EXH-001"]),
            &Catalog::demo(),
            &StatementAggregator::default(),
            &DemoCollectionSource::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("movie_ids"));
    }
}
