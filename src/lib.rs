//! Monthly spending reports from bank CSV exports.
//!
//! The pipeline runs parse, categorize, aggregate, recommend and then builds
//! the summary sheet. Everything here is in-process and free of terminal I/O;
//! the `pocketbook` binary wraps it in a CLI.

pub mod analysis;
pub mod categorizer;
pub mod error;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod recommend;
pub mod reports;
pub mod settings;
pub mod workbook;
