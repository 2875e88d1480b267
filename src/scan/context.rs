//! Per-run state: the database, the snapshot caches and "today".
//!
//! Subjects are assembled leniently: a relative that cannot be resolved is
//! left out and noted, so one dangling reference never hides the records
//! around it. Only storage failures propagate.

use std::collections::HashSet;
use std::rc::Rc;

use crate::cache::{SnapshotCache, FAMILY_CAPACITY, PERSON_CAPACITY};
use crate::db::Database;
use crate::error::{Result, VerifyError};
use crate::rules::{FamilySubject, PersonSubject, SpouseFamily};
use crate::snapshot::{FamilySnapshot, PersonSnapshot};

pub struct ScanContext<'a> {
    db: &'a dyn Database,
    people: SnapshotCache<PersonSnapshot>,
    families: SnapshotCache<FamilySnapshot>,
    today: i32,
    unresolved: Vec<String>,
    seen_unresolved: HashSet<String>,
}

impl<'a> ScanContext<'a> {
    pub fn new(db: &'a dyn Database, today: i32) -> Self {
        Self::with_capacity(db, today, PERSON_CAPACITY, FAMILY_CAPACITY)
    }

    pub fn with_capacity(
        db: &'a dyn Database,
        today: i32,
        people: usize,
        families: usize,
    ) -> Self {
        ScanContext {
            db,
            people: SnapshotCache::new(people),
            families: SnapshotCache::new(families),
            today,
            unresolved: Vec::new(),
            seen_unresolved: HashSet::new(),
        }
    }

    pub fn db(&self) -> &'a dyn Database {
        self.db
    }

    pub fn person(&mut self, handle: &str) -> Result<Rc<PersonSnapshot>> {
        let db = self.db;
        self.people.get_or_build(handle, || {
            let person = db.person(handle)?;
            PersonSnapshot::extract(db, &person)
        })
    }

    pub fn family(&mut self, handle: &str) -> Result<Rc<FamilySnapshot>> {
        let db = self.db;
        self.families.get_or_build(handle, || {
            let family = db.family(handle)?;
            FamilySnapshot::extract(db, &family)
        })
    }

    /// Builds every snapshot up front when the whole database fits in the
    /// caches. Returns whether it did. Broken records are left for the scan
    /// to report.
    pub fn preload_all(&mut self) -> Result<bool> {
        let people = self.db.person_count()?;
        let families = self.db.family_count()?;
        if people > self.people.capacity() || families > self.families.capacity() {
            tracing::debug!(
                people,
                families,
                "database larger than the snapshot caches, loading on demand"
            );
            return Ok(false);
        }

        for handle in self.db.person_handles()? {
            if let Err(e) = self.person(&handle) {
                if !e.is_data_integrity() {
                    return Err(e);
                }
                tracing::debug!("preload skipped person {handle}: {e}");
            }
        }
        for handle in self.db.family_handles()? {
            if let Err(e) = self.family(&handle) {
                if !e.is_data_integrity() {
                    return Err(e);
                }
                tracing::debug!("preload skipped family {handle}: {e}");
            }
        }
        tracing::debug!(people, families, "preloaded snapshots");
        Ok(true)
    }

    /// Records a reference from `owner` that could not be followed. Each
    /// distinct reference is reported once per run.
    fn note_unresolved(&mut self, owner: &str, err: &VerifyError) {
        let message = format!("{owner}: reference ignored ({err})");
        if self.seen_unresolved.insert(message.clone()) {
            tracing::warn!("{message}");
            self.unresolved.push(message);
        }
    }

    /// `Ok(None)` for a broken record, which is noted and left out.
    fn lenient<T>(&mut self, owner: &str, found: Result<T>) -> Result<Option<T>> {
        match found {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_data_integrity() => {
                self.note_unresolved(owner, &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Children of `family` that resolve, in child-ref order.
    fn children_of(&mut self, family: &FamilySnapshot) -> Result<Vec<Rc<PersonSnapshot>>> {
        let owner = format!("family {}", family.handle);
        let mut children = Vec::with_capacity(family.child_refs.len());
        for child_ref in &family.child_refs {
            let found = self.person(&child_ref.child);
            if let Some(child) = self.lenient(&owner, found)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    /// The person with their spousal families, those families' children,
    /// and their siblings. Fails only when the person's own snapshot does.
    pub fn person_subject(&mut self, handle: &str) -> Result<PersonSubject> {
        let person = self.person(handle)?;
        let owner = format!("person {handle}");

        let mut families = Vec::with_capacity(person.families.len());
        for family_handle in &person.families {
            let found = self.family(family_handle);
            let Some(family) = self.lenient(&owner, found)? else {
                continue;
            };
            let children = self.children_of(&family)?;
            families.push(SpouseFamily { family, children });
        }

        let mut siblings = Vec::new();
        for family_handle in &person.parent_families {
            let found = self.family(family_handle);
            let Some(family) = self.lenient(&owner, found)? else {
                continue;
            };
            for child in self.children_of(&family)? {
                if child.handle != person.handle {
                    siblings.push(child);
                }
            }
        }

        Ok(PersonSubject {
            person,
            families,
            siblings,
            today: self.today,
        })
    }

    /// The family with its parents and resolvable children. Fails only when
    /// the family's own snapshot does.
    pub fn family_subject(&mut self, handle: &str) -> Result<FamilySubject> {
        let family = self.family(handle)?;
        let father = self.parent(family.father.as_deref())?;
        let mother = self.parent(family.mother.as_deref())?;

        let owner = format!("family {handle}");
        let mut children = Vec::with_capacity(family.child_refs.len());
        for child_ref in &family.child_refs {
            let found = self.person(&child_ref.child);
            if let Some(child) = self.lenient(&owner, found)? {
                children.push((child_ref.clone(), child));
            }
        }

        Ok(FamilySubject {
            family,
            father,
            mother,
            children,
        })
    }

    fn parent(&mut self, handle: Option<&str>) -> Result<Rc<PersonSnapshot>> {
        match handle {
            Some(handle) => self.person(handle),
            None => Ok(Rc::new(PersonSnapshot::empty())),
        }
    }

    /// Unresolved references noted since the last call.
    pub fn take_unresolved(&mut self) -> Vec<String> {
        std::mem::take(&mut self.unresolved)
    }

    pub fn clear(&mut self) {
        self.people.clear();
        self.families.clear();
    }

    /// (people cached, families cached)
    pub fn cached(&self) -> (usize, usize) {
        (self.people.len(), self.families.len())
    }

    /// Snapshot cache (hits, misses) over both caches.
    pub fn cache_stats(&self) -> (u64, u64) {
        let (person_hits, person_misses) = self.people.stats();
        let (family_hits, family_misses) = self.families.stats();
        (person_hits + family_hits, person_misses + family_misses)
    }
}
