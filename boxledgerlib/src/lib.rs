//! boxledgerlib — box-office collections and closing statements for movie
//! distribution (day-wise and weekly aggregation, AC charges, revenue share).

pub mod aggregate;
pub mod approval;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod money;
pub mod policy;
pub mod submission;
pub mod traits;
pub mod validation;

pub mod sources {
    pub mod demo;
    pub mod memory;
}

pub mod formats {
    pub mod csv;
    pub mod json;
    pub mod text;
    pub mod xml;
}
