//! In-memory database, loaded from a JSON tree export.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{Result, VerifyError};
use crate::model::{Event, Family, Handle, Person};

/// On-disk shape of a tree export.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TreeFile {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub families: Vec<Family>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    path: PathBuf,
    people: BTreeMap<Handle, Person>,
    families: BTreeMap<Handle, Family>,
    events: BTreeMap<Handle, Event>,
}

impl MemoryDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MemoryDatabase {
            path: path.into(),
            ..MemoryDatabase::default()
        }
    }

    pub fn from_tree(path: impl Into<PathBuf>, tree: TreeFile) -> Self {
        let mut db = MemoryDatabase::new(path);
        for person in tree.people {
            db.insert_person(person);
        }
        for family in tree.families {
            db.insert_family(family);
        }
        for event in tree.events {
            db.insert_event(event);
        }
        db
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let tree: TreeFile = serde_json::from_str(&raw)?;
        tracing::debug!(
            people = tree.people.len(),
            families = tree.families.len(),
            events = tree.events.len(),
            "loaded tree export {}",
            path.display()
        );
        Ok(MemoryDatabase::from_tree(path, tree))
    }

    pub fn to_tree(&self) -> TreeFile {
        TreeFile {
            people: self.people.values().cloned().collect(),
            families: self.families.values().cloned().collect(),
            events: self.events.values().cloned().collect(),
        }
    }

    pub fn insert_person(&mut self, person: Person) {
        self.people.insert(person.handle.clone(), person);
    }

    pub fn insert_family(&mut self, family: Family) {
        self.families.insert(family.handle.clone(), family);
    }

    pub fn insert_event(&mut self, event: Event) {
        self.events.insert(event.handle.clone(), event);
    }
}

impl Database for MemoryDatabase {
    fn person(&self, handle: &str) -> Result<Person> {
        self.people
            .get(handle)
            .cloned()
            .ok_or_else(|| VerifyError::MissingPerson(handle.to_string()))
    }

    fn family(&self, handle: &str) -> Result<Family> {
        self.families
            .get(handle)
            .cloned()
            .ok_or_else(|| VerifyError::MissingFamily(handle.to_string()))
    }

    fn event(&self, handle: &str) -> Result<Event> {
        self.events
            .get(handle)
            .cloned()
            .ok_or_else(|| VerifyError::MissingEvent(handle.to_string()))
    }

    fn person_handles(&self) -> Result<Vec<Handle>> {
        Ok(self.people.keys().cloned().collect())
    }

    fn family_handles(&self) -> Result<Vec<Handle>> {
        Ok(self.families.keys().cloned().collect())
    }

    fn person_count(&self) -> Result<usize> {
        Ok(self.people.len())
    }

    fn family_count(&self) -> Result<usize> {
        Ok(self.families.len())
    }

    fn save_path(&self) -> &Path {
        &self.path
    }
}
