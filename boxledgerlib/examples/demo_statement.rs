use boxledgerlib::{
    aggregate::StatementAggregator, catalog::Catalog, config::StatementConfig,
    formats::text::Text, policy::Policy, sources::demo::DemoCollectionSource, traits::WriteFormat,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two weeks of synthesized collections, printed to stdout
    let cfg = StatementConfig::new(
        "MOV-2023-001",
        "EXH-001",
        NaiveDate::from_ymd_opt(2023, 12, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2023, 12, 14).ok_or("bad date")?,
    )
    .validate(&Catalog::demo(), &Policy::default())?;
    let st = StatementAggregator::default().generate(&cfg, &DemoCollectionSource::default());
    Text::write(std::io::stdout(), &st)?;
    Ok(())
}
