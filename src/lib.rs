//! Consistency checks for genealogy databases.
//!
//! A scan walks every person and family of a [`db::Database`], builds
//! comparison-ready snapshots of them, and runs the rule catalog over each.
//! Violations the user has acknowledged are remembered per database in an
//! ignore file.

pub mod cache;
pub mod cli;
pub mod config;
pub mod date;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod rules;
pub mod scan;
pub mod snapshot;
pub mod store;
pub mod util;

pub use error::{Result, VerifyError};
