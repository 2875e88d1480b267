//! Database access used by the verification engine.
//!
//! The engine only needs handle lookups, handle iteration and counts. Two
//! backends ship with the tool:
//! - `memory`: a JSON tree export loaded fully into memory
//! - `sqlite`: one JSON record per row, the layout of the gramps dbapi backend

pub mod memory;
pub mod sqlite;

use std::path::Path;

use crate::error::{Result, VerifyError};
use crate::model::{Event, Family, Handle, Person};

pub use memory::MemoryDatabase;
pub use sqlite::SqliteDatabase;

pub trait Database {
    /// Resolves a person. A handle with no record is `VerifyError::MissingPerson`.
    fn person(&self, handle: &str) -> Result<Person>;
    fn family(&self, handle: &str) -> Result<Family>;
    fn event(&self, handle: &str) -> Result<Event>;

    fn person_handles(&self) -> Result<Vec<Handle>>;
    fn family_handles(&self) -> Result<Vec<Handle>>;

    fn person_count(&self) -> Result<usize>;
    fn family_count(&self) -> Result<usize>;

    /// Where the database lives; ignore files are keyed on this.
    fn save_path(&self) -> &Path;
}

/// Opens a database file, picking the backend from its extension.
pub fn open(path: &Path) -> Result<Box<dyn Database>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => Ok(Box::new(MemoryDatabase::from_json_file(path)?)),
        "db" | "sqlite" | "sqlite3" => Ok(Box::new(SqliteDatabase::open(path)?)),
        _ => Err(VerifyError::UnsupportedDatabase(path.to_path_buf())),
    }
}
