//! SQLite genealogy database.
//!
//! Each primary object lives in its own table keyed by handle, with the
//! record serialized as JSON in `json_data`:
//! - person: handle, gramps_id, json_data
//! - family: handle, gramps_id, json_data
//! - event: handle, gramps_id, json_data
//!
//! The tool only reads. `create` and the insert methods exist to build
//! databases for import and tests.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::de::DeserializeOwned;

use super::Database;
use crate::error::{Result, VerifyError};
use crate::model::{Event, Family, Handle, Person};

const TABLES: [&str; 3] = ["person", "family", "event"];

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    for table in TABLES {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    handle VARCHAR(50) PRIMARY KEY NOT NULL,
                    gramps_id TEXT,
                    json_data TEXT NOT NULL
                )"
            ),
            [],
        )?;
    }
    Ok(())
}

pub struct SqliteDatabase {
    conn: Connection,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Opens an existing database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(SqliteDatabase {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Creates (or reopens) a writable database with the schema in place.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(SqliteDatabase {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn insert_person(&self, person: &Person) -> Result<()> {
        self.insert("person", &person.handle, &person.id, &serde_json::to_string(person)?)
    }

    pub fn insert_family(&self, family: &Family) -> Result<()> {
        self.insert("family", &family.handle, &family.id, &serde_json::to_string(family)?)
    }

    pub fn insert_event(&self, event: &Event) -> Result<()> {
        self.insert("event", &event.handle, &event.id, &serde_json::to_string(event)?)
    }

    fn insert(&self, table: &str, handle: &str, gramps_id: &str, json: &str) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {table} (handle, gramps_id, json_data) VALUES (?1, ?2, ?3)"
        );
        self.conn.execute(&sql, params![handle, gramps_id, json])?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, table: &str, handle: &str) -> Result<Option<T>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT json_data FROM {table} WHERE handle = ?1"))?;

        let json: Option<String> = stmt.query_row(params![handle], |row| row.get(0)).optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn handles(&self, table: &str) -> Result<Vec<Handle>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT handle FROM {table} ORDER BY handle"))?;

        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<Handle>>>()?;

        Ok(handles)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl Database for SqliteDatabase {
    fn person(&self, handle: &str) -> Result<Person> {
        self.load("person", handle)?
            .ok_or_else(|| VerifyError::MissingPerson(handle.to_string()))
    }

    fn family(&self, handle: &str) -> Result<Family> {
        self.load("family", handle)?
            .ok_or_else(|| VerifyError::MissingFamily(handle.to_string()))
    }

    fn event(&self, handle: &str) -> Result<Event> {
        self.load("event", handle)?
            .ok_or_else(|| VerifyError::MissingEvent(handle.to_string()))
    }

    fn person_handles(&self) -> Result<Vec<Handle>> {
        self.handles("person")
    }

    fn family_handles(&self) -> Result<Vec<Handle>> {
        self.handles("family")
    }

    fn person_count(&self) -> Result<usize> {
        self.count("person")
    }

    fn family_count(&self) -> Result<usize> {
        self.count("family")
    }

    fn save_path(&self) -> &Path {
        &self.path
    }
}
