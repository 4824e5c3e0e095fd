//! Movies, exhibitors and which exhibitors screen which movie.
//!
//! Admin changes go through [`CatalogCommand`]s. A command is checked in full
//! before anything is written, so a failed command leaves the catalog as it
//! was.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{FieldErrors, LedgerError, Result},
    model::{ExhibitorInfo, ExhibitorStatus, MovieInfo},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Assignment {
    pub movie_id: String,
    pub exhibitor_id: String,
}

/// Flat, serializable form of a catalog, as stored in a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRecords {
    #[serde(default)]
    pub movies: Vec<MovieInfo>,
    #[serde(default)]
    pub exhibitors: Vec<ExhibitorInfo>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieForm {
    /// Generated as `MOV-<release year>-<nnn>` when absent.
    pub id: Option<String>,
    pub title: String,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExhibitorForm {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub gst_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CatalogCommand {
    CreateMovie(MovieForm),
    CreateExhibitor {
        id: Option<String>,
        details: ExhibitorForm,
    },
    UpdateExhibitor {
        id: String,
        details: ExhibitorForm,
    },
    DeactivateExhibitor {
        id: String,
    },
    Assign {
        movie_id: String,
        exhibitor_id: String,
    },
    Unassign {
        movie_id: String,
        exhibitor_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    MovieCreated(String),
    ExhibitorCreated(String),
    ExhibitorUpdated(String),
    ExhibitorDeactivated(String),
    Assigned,
    Unassigned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    movies: BTreeMap<String, MovieInfo>,
    exhibitors: BTreeMap<String, ExhibitorInfo>,
    assignments: BTreeSet<Assignment>,
}

impl Catalog {
    pub fn add_movie(
        &mut self,
        id: &str,
        title: &str,
        release_date: Option<NaiveDate>,
    ) -> &mut Self {
        self.movies.insert(
            id.to_string(),
            MovieInfo {
                id: id.to_string(),
                title: title.to_string(),
                release_date,
            },
        );
        self
    }

    pub fn add_exhibitor(
        &mut self,
        id: &str,
        name: &str,
        location: &str,
        gst_number: Option<&str>,
    ) -> &mut Self {
        self.exhibitors.insert(
            id.to_string(),
            ExhibitorInfo {
                id: id.to_string(),
                name: name.to_string(),
                location: location.to_string(),
                contact: None,
                gst_number: gst_number.map(str::to_string),
                status: ExhibitorStatus::Active,
            },
        );
        self
    }

    /// Builds a catalog from file records. Duplicate ids and assignments
    /// naming unknown movies or exhibitors are rejected.
    pub fn from_records(records: CatalogRecords) -> Result<Self> {
        let mut c = Self::default();
        for m in records.movies {
            if c.movies.contains_key(&m.id) {
                return Err(LedgerError::Duplicate(m.id));
            }
            c.movies.insert(m.id.clone(), m);
        }
        for e in records.exhibitors {
            if c.exhibitors.contains_key(&e.id) {
                return Err(LedgerError::Duplicate(e.id));
            }
            c.exhibitors.insert(e.id.clone(), e);
        }
        for a in records.assignments {
            c.require_pair(&a.movie_id, &a.exhibitor_id)?;
            c.assignments.insert(a);
        }
        Ok(c)
    }

    pub fn records(&self) -> CatalogRecords {
        CatalogRecords {
            movies: self.movies.values().cloned().collect(),
            exhibitors: self.exhibitors.values().cloned().collect(),
            assignments: self.assignments.iter().cloned().collect(),
        }
    }

    pub fn movie(&self, id: &str) -> Option<&MovieInfo> {
        self.movies.get(id)
    }

    pub fn exhibitor(&self, id: &str) -> Option<&ExhibitorInfo> {
        self.exhibitors.get(id)
    }

    pub fn movies(&self) -> impl Iterator<Item = &MovieInfo> {
        self.movies.values()
    }

    pub fn exhibitors(&self) -> impl Iterator<Item = &ExhibitorInfo> {
        self.exhibitors.values()
    }

    pub fn is_assigned(&self, movie_id: &str, exhibitor_id: &str) -> bool {
        self.assignments
            .iter()
            .any(|a| a.movie_id == movie_id && a.exhibitor_id == exhibitor_id)
    }

    /// Exhibitors screening `movie_id`, ordered by id.
    pub fn exhibitors_for<'a>(
        &'a self,
        movie_id: &'a str,
    ) -> impl Iterator<Item = &'a ExhibitorInfo> {
        self.assignments
            .iter()
            .filter(move |a| a.movie_id == movie_id)
            .filter_map(move |a| self.exhibitors.get(&a.exhibitor_id))
    }

    pub fn execute(&mut self, command: CatalogCommand) -> Result<CatalogChange> {
        let change = match command {
            CatalogCommand::CreateMovie(form) => {
                let release_date = check_movie(&form)?;
                let id = match form.id.filter(|id| !id.trim().is_empty()) {
                    Some(id) if self.movies.contains_key(id.trim()) => {
                        return Err(LedgerError::Duplicate(id));
                    }
                    Some(id) => id.trim().to_string(),
                    None => self.next_movie_id(release_date.year()),
                };
                self.add_movie(&id, form.title.trim(), Some(release_date));
                CatalogChange::MovieCreated(id)
            }
            CatalogCommand::CreateExhibitor { id, details } => {
                check_exhibitor(&details)?;
                let id = match id.filter(|id| !id.trim().is_empty()) {
                    Some(id) if self.exhibitors.contains_key(id.trim()) => {
                        return Err(LedgerError::Duplicate(id));
                    }
                    Some(id) => id.trim().to_string(),
                    None => self.next_exhibitor_id(),
                };
                self.exhibitors.insert(
                    id.clone(),
                    ExhibitorInfo {
                        id: id.clone(),
                        status: ExhibitorStatus::Active,
                        ..exhibitor_from(details)
                    },
                );
                CatalogChange::ExhibitorCreated(id)
            }
            CatalogCommand::UpdateExhibitor { id, details } => {
                check_exhibitor(&details)?;
                let current = self
                    .exhibitors
                    .get_mut(&id)
                    .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
                *current = ExhibitorInfo {
                    id: id.clone(),
                    status: current.status,
                    ..exhibitor_from(details)
                };
                CatalogChange::ExhibitorUpdated(id)
            }
            CatalogCommand::DeactivateExhibitor { id } => {
                let current = self
                    .exhibitors
                    .get_mut(&id)
                    .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
                if !current.is_active() {
                    return Err(LedgerError::InvalidTransition {
                        id,
                        status: current.status.to_string(),
                        action: "deactivate",
                    });
                }
                current.status = ExhibitorStatus::Inactive;
                CatalogChange::ExhibitorDeactivated(id)
            }
            CatalogCommand::Assign {
                movie_id,
                exhibitor_id,
            } => {
                check_pair(&movie_id, &exhibitor_id)?;
                let exhibitor = self.require_pair(&movie_id, &exhibitor_id)?;
                if !exhibitor.is_active() {
                    return Err(LedgerError::InvalidTransition {
                        id: exhibitor_id,
                        status: exhibitor.status.to_string(),
                        action: "assign",
                    });
                }
                let pair = Assignment {
                    movie_id,
                    exhibitor_id,
                };
                if self.assignments.contains(&pair) {
                    return Err(LedgerError::Duplicate(format!(
                        "{}/{}",
                        pair.movie_id, pair.exhibitor_id
                    )));
                }
                self.assignments.insert(pair);
                CatalogChange::Assigned
            }
            CatalogCommand::Unassign {
                movie_id,
                exhibitor_id,
            } => {
                check_pair(&movie_id, &exhibitor_id)?;
                let pair = Assignment {
                    movie_id,
                    exhibitor_id,
                };
                if !self.assignments.remove(&pair) {
                    return Err(LedgerError::NotFound(format!(
                        "{}/{}",
                        pair.movie_id, pair.exhibitor_id
                    )));
                }
                CatalogChange::Unassigned
            }
        };
        info!(?change, "catalog updated");
        Ok(change)
    }

    fn require_pair(&self, movie_id: &str, exhibitor_id: &str) -> Result<&ExhibitorInfo> {
        if !self.movies.contains_key(movie_id) {
            return Err(LedgerError::NotFound(movie_id.to_string()));
        }
        self.exhibitors
            .get(exhibitor_id)
            .ok_or_else(|| LedgerError::NotFound(exhibitor_id.to_string()))
    }

    fn next_movie_id(&self, year: i32) -> String {
        (self.movies.len() + 1..)
            .map(|n| format!("MOV-{year}-{n:03}"))
            .find(|id| !self.movies.contains_key(id))
            .unwrap_or_default()
    }

    fn next_exhibitor_id(&self) -> String {
        (self.exhibitors.len() + 1..)
            .map(|n| format!("EXH-{n:03}"))
            .find(|id| !self.exhibitors.contains_key(id))
            .unwrap_or_default()
    }

    /// The titles and venues the dashboard ships with. Every movie is
    /// assigned to every exhibitor.
    pub fn demo() -> Self {
        let mut c = Self::default();
        c.add_movie("MOV-2023-001", "Pathaan", NaiveDate::from_ymd_opt(2023, 1, 25))
            .add_movie("MOV-2023-002", "Jawan", NaiveDate::from_ymd_opt(2023, 9, 7))
            .add_movie("MOV-2023-003", "Dunki", NaiveDate::from_ymd_opt(2023, 12, 21))
            .add_movie("MOV-2023-004", "Tiger 3", NaiveDate::from_ymd_opt(2023, 11, 12))
            .add_movie("MOV-2023-005", "Animal", NaiveDate::from_ymd_opt(2023, 12, 1));
        c.add_exhibitor(
            "EXH-001",
            "PVR Cinemas - Mumbai Central",
            "Mumbai, Maharashtra",
            Some("27AAACP1234A1Z5"),
        )
        .add_exhibitor(
            "EXH-002",
            "INOX Megaplex - Delhi Connaught Place",
            "New Delhi, Delhi",
            Some("07AAACP5678B1Z9"),
        )
        .add_exhibitor(
            "EXH-003",
            "Cinepolis - Bangalore Whitefield",
            "Bengaluru, Karnataka",
            Some("29AAACP9012C1Z3"),
        )
        .add_exhibitor(
            "EXH-004",
            "Carnival Cinemas - Pune Bund Garden",
            "Pune, Maharashtra",
            Some("27AAACP3456D1Z7"),
        )
        .add_exhibitor(
            "EXH-005",
            "Miraj Cinemas - Hyderabad Banjara Hills",
            "Hyderabad, Telangana",
            Some("36AAACP7890E1Z1"),
        );
        let pairs: Vec<_> = c
            .movies
            .keys()
            .flat_map(|m| {
                c.exhibitors.keys().map(move |e| Assignment {
                    movie_id: m.clone(),
                    exhibitor_id: e.clone(),
                })
            })
            .collect();
        c.assignments.extend(pairs);
        c
    }
}

fn check_movie(form: &MovieForm) -> Result<NaiveDate> {
    let mut errors = FieldErrors::default();
    if form.title.trim().is_empty() {
        errors.push("title", "Movie title is required");
    }
    if form.release_date.is_none() {
        errors.push("release_date", "Release date is required");
    }
    match form.release_date {
        Some(date) if errors.is_empty() => Ok(date),
        _ => Err(LedgerError::Config(errors)),
    }
}

fn check_exhibitor(form: &ExhibitorForm) -> Result<()> {
    let mut errors = FieldErrors::default();
    if form.name.trim().is_empty() {
        errors.push("name", "Theater name is required");
    }
    if form.location.trim().is_empty() {
        errors.push("location", "Theater location is required");
    }
    if form.contact.trim().is_empty() {
        errors.push("contact", "Contact person is required");
    }
    errors.into_result()
}

fn check_pair(movie_id: &str, exhibitor_id: &str) -> Result<()> {
    let mut errors = FieldErrors::default();
    if movie_id.trim().is_empty() || exhibitor_id.trim().is_empty() {
        errors.push("assignment", "Please select both exhibitor and movie");
    }
    errors.into_result()
}

fn exhibitor_from(form: ExhibitorForm) -> ExhibitorInfo {
    ExhibitorInfo {
        id: String::new(),
        name: form.name.trim().to_string(),
        location: form.location.trim().to_string(),
        contact: Some(form.contact.trim().to_string()),
        gst_number: form.gst_number.filter(|g| !g.trim().is_empty()),
        status: ExhibitorStatus::Active,
    }
}
