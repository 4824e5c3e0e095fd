use boxledgerlib::{
    aggregate::StatementAggregator,
    catalog::Catalog,
    config::StatementConfig,
    formats::csv::Csv,
    model::DayStatus,
    policy::Policy,
    sources::memory::InMemoryRepository,
    submission::SubmissionStatus,
    traits::{ReadFormat, WriteFormat},
    validation::{Severity, validate_statement},
};
use chrono::NaiveDate;
use std::io::Cursor;

const SUBMISSIONS: &str = "\
id,movie_id,exhibitor_id,date,matinee_shows,matinee_tickets,matinee_gross,afternoon_shows,afternoon_tickets,afternoon_gross,first_shows,first_tickets,first_gross,second_shows,second_tickets,second_gross,submitted_by,submitted_at,status,reviewed_by,reviewed_at,review_comment,remarks
COL-2023-001,MOV-2023-001,EXH-001,2023-12-01,1,175,45000,1,230,65000,1,285,85000,1,200,50000,Rajesh Kumar,2023-12-01T18:30:00Z,approved,Admin User,2023-12-02T10:30:00Z,,Good response
COL-2023-002,MOV-2023-001,EXH-001,2023-12-02,1,150,35000,1,220,55000,1,300,75000,1,90,20000,Priya Sharma,,approved,Admin User,2023-12-03T10:30:00Z,,
COL-2023-003,MOV-2023-001,EXH-001,2023-12-03,,,,,,,1,100,20000,,,,Priya Sharma,,pending,,,,
";

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, d).unwrap()
}

#[test]
fn imported_submissions_feed_the_statement() {
    let subs = Csv::read(Cursor::new(SUBMISSIONS)).expect("read csv");
    assert_eq!(subs.len(), 3);
    assert_eq!(subs[0].shows.total_gross(), Some(245_000));
    assert_eq!(subs[2].status, SubmissionStatus::Pending);
    assert_eq!(subs[2].shows.total_tickets(), Some(100));

    let repo = InMemoryRepository::with_submissions(subs).unwrap();
    let cfg = StatementConfig::new("MOV-2023-001", "EXH-001", date(1), date(4))
        .validate(&Catalog::demo(), &Policy::default())
        .unwrap();
    let st = StatementAggregator::default().generate(&cfg, &repo);

    let status: Vec<_> = st.daily_collections.iter().map(|d| d.status).collect();
    assert_eq!(
        status,
        [DayStatus::Reported, DayStatus::Reported, DayStatus::Missing, DayStatus::Missing]
    );
    assert_eq!(st.totals.total_gross, 245_000 + 185_000);
    assert_eq!(st.totals.total_ac_charges, (890 + 760) * 5);

    let issues = validate_statement(&st, &Policy::default());
    let missing = issues.iter().find(|i| i.severity == Severity::Warning).unwrap();
    assert_eq!(missing.affected_dates, [date(3), date(4)]);
}

#[test]
fn statement_csv_has_one_row_per_day() {
    let subs = Csv::read(Cursor::new(SUBMISSIONS)).unwrap();
    let repo = InMemoryRepository::with_submissions(subs).unwrap();
    let cfg = StatementConfig::new("MOV-2023-001", "EXH-001", date(1), date(9))
        .validate(&Catalog::demo(), &Policy::default())
        .unwrap();
    let st = StatementAggregator::default().generate(&cfg, &repo);

    let mut out = Vec::new();
    Csv::write(&mut out, &st).expect("write csv");
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "statement_number,movie_id,exhibitor_id,week_number,date,day,status,shows,tickets,\
             gross,ac_charges,net"
        )
    );
    let rows: Vec<_> = lines.collect();
    assert_eq!(rows.len(), 9);
    assert!(rows[0].ends_with(",1,2023-12-01,Friday,reported,4,890,245000,4450,240550"));
    assert!(rows[8].contains(",2,2023-12-09,Saturday,missing,"));
}

#[test]
fn submissions_survive_a_write_and_read() {
    let subs = Csv::read(Cursor::new(SUBMISSIONS)).unwrap();
    let mut out = Vec::new();
    Csv::write_submissions(&mut out, &subs).unwrap();
    let again = Csv::read(Cursor::new(out)).unwrap();
    assert_eq!(again, subs);
}

#[test]
fn bad_date_is_a_parse_error() {
    let bad = SUBMISSIONS.replace("2023-12-02,1,150", "2023-13-02,1,150");
    let err = Csv::read(Cursor::new(bad)).unwrap_err();
    assert!(err.to_string().contains("COL-2023-002"));
}

#[test]
fn oversized_ticket_counts_are_refused_on_import() {
    let huge = SUBMISSIONS.replace(
        "2023-12-01,1,175,45000,1,230,65000",
        "2023-12-01,1,3000000000,45000,1,3000000000,65000",
    );
    let subs = Csv::read(Cursor::new(huge)).expect("rows still parse");
    assert_eq!(subs[0].shows.total_tickets(), None);

    let err = InMemoryRepository::with_submissions(subs).unwrap_err();
    assert!(err.to_string().contains("Ticket count too large"));
}
