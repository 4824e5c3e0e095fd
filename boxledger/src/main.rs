mod settings;

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use boxledgerlib::{
    aggregate::StatementAggregator,
    approval::{ApprovalCommand, ApprovalOutcome, ApprovalRequest, ApprovalService},
    batch::{BatchRequest, BatchStatus, generate_batch},
    catalog::{Catalog, CatalogChange, CatalogCommand, ExhibitorForm, MovieForm},
    config::{DateRange, QuickRange, StatementConfig},
    error::{FieldErrors, LedgerError},
    formats::{csv::Csv, json::Json, text::Text, xml::SimpleXml},
    model::{Statement, TemplateFormat},
    sources::{demo::DemoCollectionSource, memory::InMemoryRepository},
    traits::{CollectionSource, ReadFormat, WriteFormat},
    validation::validate_statement,
};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("review failed: {0}")]
    Review(LedgerError),
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Fmt {
    Text,
    Csv,
    Json,
    Xml,
}

impl Fmt {
    const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Template {
    Standard,
    Detailed,
    Summary,
    Producer,
}

impl From<Template> for TemplateFormat {
    fn from(t: Template) -> Self {
        match t {
            Template::Standard => Self::Standard,
            Template::Detailed => Self::Detailed,
            Template::Summary => Self::Summary,
            Template::Producer => Self::Producer,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Range {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

impl From<Range> for QuickRange {
    fn from(r: Range) -> Self {
        match r {
            Range::ThisWeek => Self::ThisWeek,
            Range::LastWeek => Self::LastWeek,
            Range::ThisMonth => Self::ThisMonth,
            Range::LastMonth => Self::LastMonth,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "boxledger", version, about = "Box-office collections and closing statements")]
struct Cli {
    /// Settings file (default: ./boxledger.{toml,yaml,json} if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Movies, exhibitors and assignments (toml, yaml or json). Overrides
    /// `catalog_file` from settings; without either, only demo runs work
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Where daily collections come from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Submissions CSV; only approved rows count. Without it, demo data is synthesized
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Seed for demo data
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Statement period: explicit dates, or a quick range relative to today.
#[derive(Args, Debug)]
struct PeriodArgs {
    #[arg(long)]
    start: Option<NaiveDate>,

    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long, value_enum, conflicts_with_all = ["start", "end"])]
    range: Option<Range>,

    /// Reference date for --range (default: local today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

impl PeriodArgs {
    fn resolve(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.range {
            Some(r) => {
                let today = self.today.unwrap_or_else(|| Local::now().date_naive());
                let DateRange { start, end } = QuickRange::from(r).resolve(today);
                (Some(start), Some(end))
            }
            None => (self.start, self.end),
        }
    }
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[arg(long, value_enum, default_value_t = Template::Standard)]
    template: Template,

    /// Leave out the 7-day summaries
    #[arg(long)]
    no_weekly_summary: bool,

    /// Leave out the exhibitor's GST number
    #[arg(long)]
    no_gst: bool,

    #[arg(long = "out-format", value_enum, default_value_t = Fmt::Text)]
    out_format: Fmt,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one closing statement
    Generate {
        #[arg(long)]
        movie: Option<String>,

        #[arg(long)]
        exhibitor: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Generate statements for every movie × exhibitor pair
    Batch {
        #[arg(long, value_delimiter = ',', required = true)]
        movies: Vec<String>,

        #[arg(long, value_delimiter = ',', required = true)]
        exhibitors: Vec<String>,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Directory for one file per statement
        #[arg(long = "out-dir")]
        out_dir: PathBuf,
    },

    /// Approve, reject or archive a submission and write the updated CSV
    Review {
        /// Submissions CSV
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Output CSV (default stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        #[arg(long)]
        id: String,

        #[arg(long, default_value = "Admin User")]
        reviewer: String,

        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Manage movies, exhibitors and assignments; changes print the updated
    /// catalog as JSON
    Catalog {
        /// Output file for the updated catalog (default stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Args, Debug)]
struct ExhibitorArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    location: String,

    /// Contact person, optionally with a phone number
    #[arg(long)]
    contact: String,

    #[arg(long)]
    gst: Option<String>,
}

impl From<ExhibitorArgs> for ExhibitorForm {
    fn from(a: ExhibitorArgs) -> Self {
        Self {
            name: a.name,
            location: a.location,
            contact: a.contact,
            gst_number: a.gst,
        }
    }
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    List,
    AddMovie {
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        title: String,

        #[arg(long)]
        release_date: NaiveDate,
    },
    AddExhibitor {
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        details: ExhibitorArgs,
    },
    UpdateExhibitor {
        #[arg(long)]
        id: String,

        #[command(flatten)]
        details: ExhibitorArgs,
    },
    DeactivateExhibitor {
        #[arg(long)]
        id: String,
    },
    Assign {
        #[arg(long)]
        movie: String,

        #[arg(long)]
        exhibitor: String,
    },
    Unassign {
        #[arg(long)]
        movie: String,

        #[arg(long)]
        exhibitor: String,
    },
}

impl CatalogAction {
    fn into_command(self) -> Option<CatalogCommand> {
        Some(match self {
            Self::List => return None,
            Self::AddMovie {
                id,
                title,
                release_date,
            } => CatalogCommand::CreateMovie(MovieForm {
                id,
                title,
                release_date: Some(release_date),
            }),
            Self::AddExhibitor { id, details } => CatalogCommand::CreateExhibitor {
                id,
                details: details.into(),
            },
            Self::UpdateExhibitor { id, details } => CatalogCommand::UpdateExhibitor {
                id,
                details: details.into(),
            },
            Self::DeactivateExhibitor { id } => CatalogCommand::DeactivateExhibitor { id },
            Self::Assign { movie, exhibitor } => CatalogCommand::Assign {
                movie_id: movie,
                exhibitor_id: exhibitor,
            },
            Self::Unassign { movie, exhibitor } => CatalogCommand::Unassign {
                movie_id: movie,
                exhibitor_id: exhibitor,
            },
        })
    }
}

#[derive(Subcommand, Debug)]
enum ReviewAction {
    Approve {
        #[arg(long)]
        comment: Option<String>,
    },
    Reject {
        #[arg(long)]
        reason: String,
    },
    Archive,
}

impl From<ReviewAction> for ApprovalCommand {
    fn from(a: ReviewAction) -> Self {
        match a {
            ReviewAction::Approve { comment } => Self::Approve { comment },
            ReviewAction::Reject { reason } => Self::Reject { reason },
            ReviewAction::Archive => Self::Archive,
        }
    }
}

fn load_repository(path: &Path) -> Result<InMemoryRepository> {
    let subs = Csv::read(BufReader::new(File::open(path)?))?;
    info!(path = %path.display(), count = subs.len(), "submissions loaded");
    Ok(InMemoryRepository::with_submissions(subs)?)
}

/// The catalog file wins; the built-in demo catalog is only used when
/// collections are synthesized as well.
fn open_catalog(path: Option<&Path>, demo_mode: bool) -> Result<Catalog> {
    match path {
        Some(p) => {
            let catalog = Catalog::from_records(settings::read_catalog(p)?)?;
            info!(
                path = %p.display(),
                movies = catalog.movies().count(),
                exhibitors = catalog.exhibitors().count(),
                "catalog loaded"
            );
            Ok(catalog)
        }
        None if demo_mode => Ok(Catalog::demo()),
        None => {
            let mut errors = FieldErrors::default();
            errors.push("catalog", "A catalog file is required with --input");
            Err(LedgerError::Config(errors).into())
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("MOVIES");
    for m in catalog.movies() {
        let released = m.release_date.map(|d| d.to_string()).unwrap_or_default();
        println!("{:<14} {:<32} {released}", m.id, m.title);
    }
    println!("EXHIBITORS");
    for e in catalog.exhibitors() {
        println!("{:<14} {:<40} {:<24} {}", e.id, e.name, e.location, e.status);
    }
    println!("ASSIGNMENTS");
    for m in catalog.movies() {
        let ids: Vec<_> = catalog.exhibitors_for(&m.id).map(|e| e.id.as_str()).collect();
        if !ids.is_empty() {
            println!("{:<14} {}", m.id, ids.join(", "));
        }
    }
}

fn open_source(args: &SourceArgs) -> Result<Box<dyn CollectionSource>> {
    Ok(match &args.input {
        Some(path) => Box::new(load_repository(path)?),
        None => {
            info!(seed = args.seed, "no input given, using demo collections");
            Box::new(DemoCollectionSource::new(args.seed))
        }
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(File::create(p)?),
        None => Box::new(io::stdout()),
    })
}

fn write_statement(w: &mut dyn Write, fmt: Fmt, st: &Statement) -> Result<()> {
    match fmt {
        Fmt::Text => Text::write(&mut *w, st),
        Fmt::Csv => Csv::write(&mut *w, st),
        Fmt::Json => Json::write(&mut *w, st),
        Fmt::Xml => SimpleXml::write(&mut *w, st),
    }?;
    w.flush()?;
    Ok(())
}

fn report_issues(st: &Statement, settings: &Settings) {
    for issue in validate_statement(st, &settings.policy) {
        let dates: Vec<_> = issue.affected_dates.iter().map(ToString::to_string).collect();
        if dates.is_empty() {
            eprintln!("[{}] {}: {}", issue.severity, issue.message, issue.details);
        } else {
            eprintln!(
                "[{}] {}: {} ({})",
                issue.severity,
                issue.message,
                issue.details,
                dates.join(", ")
            );
        }
    }
}

fn run(command: Command, catalog_path: Option<&Path>, settings: &Settings) -> Result<()> {
    let aggregator = StatementAggregator::new(settings.policy);

    match command {
        Command::Generate {
            movie,
            exhibitor,
            period,
            layout,
            source,
            output,
        } => {
            let catalog = open_catalog(catalog_path, source.input.is_none())?;
            let (start_date, end_date) = period.resolve();
            let cfg = StatementConfig {
                movie_id: movie.unwrap_or_default(),
                exhibitor_id: exhibitor.unwrap_or_default(),
                start_date,
                end_date,
                template: layout.template.into(),
                include_weekly_summary: !layout.no_weekly_summary,
                include_gst_details: !layout.no_gst,
            }
            .validate(&catalog, &settings.policy)?;
            if !catalog.is_assigned(&cfg.movie().id, &cfg.exhibitor().id) {
                warn!(
                    movie = %cfg.movie().id,
                    exhibitor = %cfg.exhibitor().id,
                    "exhibitor is not assigned to this movie"
                );
            }

            let src = open_source(&source)?;
            let st = aggregator.generate(&cfg, src.as_ref());
            report_issues(&st, settings);

            let mut w = open_output(output.as_deref())?;
            write_statement(w.as_mut(), layout.out_format, &st)
        }

        Command::Batch {
            movies,
            exhibitors,
            period,
            layout,
            source,
            out_dir,
        } => {
            let catalog = open_catalog(catalog_path, source.input.is_none())?;
            let (start, end) = period.resolve();
            let (Some(start), Some(end)) = (start, end) else {
                let mut errors = FieldErrors::default();
                errors.push("range", "Give --start and --end, or --range");
                return Err(LedgerError::Config(errors).into());
            };
            let request = BatchRequest {
                movie_ids: movies,
                exhibitor_ids: exhibitors,
                range: DateRange { start, end },
                template: layout.template.into(),
                include_weekly_summary: !layout.no_weekly_summary,
                include_gst_details: !layout.no_gst,
            };

            let src = open_source(&source)?;
            let report = generate_batch(&request, &catalog, &aggregator, src.as_ref())?;

            fs::create_dir_all(&out_dir)?;
            for item in &report.items {
                match &item.status {
                    BatchStatus::Completed(st) => {
                        let ext = layout.out_format.extension();
                        let path = out_dir.join(format!("{}.{ext}", item.id));
                        let mut w = File::create(&path)?;
                        write_statement(&mut w, layout.out_format, st)?;
                        println!("completed  {}  {}", item.id, path.display());
                    }
                    BatchStatus::Failed(e) => println!("failed     {}  {e}", item.id),
                }
            }
            println!("{}/{} statements generated", report.completed(), report.total());
            Ok(())
        }

        Command::Review {
            input,
            output,
            id,
            reviewer,
            action,
        } => {
            let mut svc = ApprovalService::new(load_repository(&input)?);
            let outcome = svc.execute(ApprovalRequest {
                submission_id: id.clone(),
                reviewer,
                at: Utc::now(),
                command: action.into(),
            });
            match outcome {
                ApprovalOutcome::Approved => eprintln!("{id}: approved"),
                ApprovalOutcome::Rejected(reason) => eprintln!("{id}: rejected ({reason})"),
                ApprovalOutcome::Archived => eprintln!("{id}: archived"),
                ApprovalOutcome::Failed(e) => return Err(CliError::Review(e)),
            }

            let repo = svc.into_inner();
            let mut w = open_output(output.as_deref())?;
            Csv::write_submissions(&mut w, repo.all())?;
            w.flush()?;
            Ok(())
        }

        Command::Catalog { output, action } => {
            let mut catalog = open_catalog(catalog_path, true)?;
            let Some(command) = action.into_command() else {
                print_catalog(&catalog);
                return Ok(());
            };
            match catalog.execute(command)? {
                CatalogChange::MovieCreated(id) => eprintln!("{id}: movie created"),
                CatalogChange::ExhibitorCreated(id) => eprintln!("{id}: exhibitor created"),
                CatalogChange::ExhibitorUpdated(id) => eprintln!("{id}: exhibitor updated"),
                CatalogChange::ExhibitorDeactivated(id) => eprintln!("{id}: exhibitor deactivated"),
                CatalogChange::Assigned => eprintln!("assignment added"),
                CatalogChange::Unassigned => eprintln!("assignment removed"),
            }

            let mut w = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut w, &catalog.records())?;
            writeln!(w)?;
            w.flush()?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .with_writer(io::stderr)
        .init();

    let catalog_path = cli.catalog.or_else(|| settings.catalog_file.clone());
    match run(cli.command, catalog_path.as_deref(), &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn quick_range_resolves_against_today() {
        let p = PeriodArgs {
            start: None,
            end: None,
            range: Some(Range::ThisMonth),
            today: NaiveDate::from_ymd_opt(2023, 12, 12),
        };
        assert_eq!(
            p.resolve(),
            (NaiveDate::from_ymd_opt(2023, 12, 1), NaiveDate::from_ymd_opt(2023, 12, 12))
        );
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "boxledger",
            "generate",
            "--movie",
            "MOV-2023-001",
            "--exhibitor",
            "EXH-001",
            "--start",
            "2023-12-01",
            "--end",
            "2023-12-07",
            "--template",
            "summary",
            "--out-format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Generate { layout, period, .. } => {
                assert!(matches!(layout.template, Template::Summary));
                assert!(matches!(layout.out_format, Fmt::Json));
                assert_eq!(period.start, NaiveDate::from_ymd_opt(2023, 12, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn real_submissions_need_a_catalog_file() {
        assert!(open_catalog(None, true).is_ok());
        let err = open_catalog(None, false).unwrap_err();
        assert!(err.to_string().contains("catalog file is required"));
    }

    #[test]
    fn parses_catalog_commands() {
        let cli = Cli::try_parse_from([
            "boxledger",
            "catalog",
            "--catalog",
            "catalog.toml",
            "add-exhibitor",
            "--name",
            "Sathyam Cinemas",
            "--location",
            "Chennai, Tamil Nadu",
            "--contact",
            "Arun Prakash",
        ])
        .unwrap();
        assert_eq!(cli.catalog.as_deref(), Some(Path::new("catalog.toml")));
        let Command::Catalog { action, .. } = cli.command else {
            panic!("expected catalog command");
        };
        match action.into_command() {
            Some(CatalogCommand::CreateExhibitor { id: None, details }) => {
                assert_eq!(details.name, "Sathyam Cinemas");
                assert_eq!(details.gst_number, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
