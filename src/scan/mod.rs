pub mod context;
pub mod progress;

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::config::VerifyOptions;
use crate::date;
use crate::db::Database;
use crate::error::{Result, VerifyError};
use crate::model::Handle;
use crate::rules::{self, FamilyRule, PersonRule, Violation};
pub use context::ScanContext;
pub use progress::{NoProgress, Progress, StderrProgress};

#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub violations: Vec<Violation>,
    pub diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    pub people_checked: usize,
    pub families_checked: usize,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<usize>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl ScanResult {
    pub fn empty() -> Self {
        ScanResult {
            violations: Vec::new(),
            diagnostics: Vec::new(),
            duration_ms: None,
            people_checked: 0,
            families_checked: 0,
            cancelled: false,
            peak_memory_bytes: None,
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn errors(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == rules::Severity::Error)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.violations.len() - self.errors()
    }
}

fn current_memory() -> Option<usize> {
    memory_stats::memory_stats().map(|stats| stats.physical_mem)
}

struct Scanner<'a, 'p> {
    ctx: ScanContext<'a>,
    person_rules: Vec<Box<dyn PersonRule>>,
    family_rules: Vec<Box<dyn FamilyRule>>,
    progress: &'p mut dyn Progress,
    result: ScanResult,
    peak_memory: Option<usize>,
}

impl Scanner<'_, '_> {
    fn sample_memory(&mut self) {
        if let Some(now) = current_memory() {
            self.peak_memory = Some(self.peak_memory.map_or(now, |peak| peak.max(now)));
        }
    }

    /// Skips an object whose own record is broken. Storage errors end the scan.
    fn skip(&mut self, kind: &str, handle: &str, err: VerifyError) -> Result<()> {
        if !err.is_data_integrity() {
            return Err(err);
        }
        tracing::warn!("skipping {kind} {handle}: {err}");
        self.result.diagnostics.push(format!("{kind} {handle}: skipped ({err})"));
        Ok(())
    }

    fn collect_unresolved(&mut self) {
        let unresolved = self.ctx.take_unresolved();
        self.result.diagnostics.extend(unresolved);
    }

    fn check_person(&mut self, handle: &str) -> Result<()> {
        let subject = self.ctx.person_subject(handle);
        self.collect_unresolved();
        let subject = match subject {
            Ok(subject) => subject,
            Err(e) => return self.skip("person", handle, e),
        };

        for rule in &self.person_rules {
            if let rules::Verdict::Broken(culprit) = rule.check(&subject) {
                self.result
                    .violations
                    .push(Violation::for_person(rule.as_ref(), culprit, &subject.person));
            }
        }
        self.result.people_checked += 1;
        Ok(())
    }

    fn check_family(&mut self, handle: &str) -> Result<()> {
        let subject = self.ctx.family_subject(handle);
        self.collect_unresolved();
        let subject = match subject {
            Ok(subject) => subject,
            Err(e) => return self.skip("family", handle, e),
        };

        for rule in &self.family_rules {
            if let rules::Verdict::Broken(culprit) = rule.check(&subject) {
                self.result
                    .violations
                    .push(Violation::for_family(rule.as_ref(), culprit, &subject.family));
            }
        }
        self.result.families_checked += 1;
        Ok(())
    }

    /// Ticks progress; true when the caller should stop.
    fn advance(&mut self) -> bool {
        self.progress.tick();
        if self.progress.is_cancelled() {
            self.result.cancelled = true;
        }
        self.result.cancelled
    }

    fn run(mut self) -> Result<ScanResult> {
        let db = self.ctx.db();
        let person_handles = db.person_handles()?;
        let mut pending: BTreeSet<Handle> = db.family_handles()?.into_iter().collect();

        self.progress.set_total(person_handles.len() + pending.len());
        if self.ctx.preload_all()? {
            self.sample_memory();
        }

        // each family is checked the first time one of its spouses comes up
        'people: for handle in &person_handles {
            let spouse_families = match self.ctx.person(handle) {
                Ok(person) => person.families.clone(),
                Err(e) if e.is_data_integrity() => Vec::new(),
                Err(e) => return Err(e),
            };
            for family in spouse_families {
                if pending.remove(&family) {
                    self.check_family(&family)?;
                    if self.advance() {
                        break 'people;
                    }
                }
            }

            self.check_person(handle)?;
            if self.advance() {
                break;
            }
        }

        if !self.result.cancelled {
            let remaining: Vec<Handle> = pending.into_iter().collect();
            for handle in remaining {
                self.check_family(&handle)?;
                if self.advance() {
                    break;
                }
            }
        }

        self.sample_memory();
        let (hits, misses) = self.ctx.cache_stats();
        self.result.cache_hits = hits;
        self.result.cache_misses = misses;
        self.ctx.clear();
        self.result.peak_memory_bytes = self.peak_memory;
        Ok(self.result)
    }
}

/// Checks every person and family of `db` against the rule catalog.
pub fn run(
    db: &dyn Database,
    options: &VerifyOptions,
    progress: &mut dyn Progress,
) -> Result<ScanResult> {
    run_at(db, options, date::today(), progress)
}

/// Same as [`run`] with a fixed "today".
pub fn run_at(
    db: &dyn Database,
    options: &VerifyOptions,
    today: i32,
    progress: &mut dyn Progress,
) -> Result<ScanResult> {
    let start = Instant::now();
    tracing::info!(path = %db.save_path().display(), "scan started");

    let scanner = Scanner {
        ctx: ScanContext::new(db, today),
        person_rules: rules::person_rules(options),
        family_rules: rules::family_rules(options),
        progress,
        result: ScanResult::empty(),
        peak_memory: current_memory(),
    };
    let mut result = scanner.run()?;

    result.duration_ms = Some(start.elapsed().as_millis());
    tracing::info!(
        people = result.people_checked,
        families = result.families_checked,
        violations = result.violations.len(),
        skipped = result.diagnostics.len(),
        cancelled = result.cancelled,
        "scan finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::day_number;
    use crate::db::MemoryDatabase;
    use crate::model::{
        ChildRef, Date, Event, EventRef, EventRole, EventType, Family, FamilyRelation, Gender, Name,
        NameType, Person,
    };

    fn person(
        handle: &str,
        gender: Gender,
        events: &[&str],
        parents: &[&str],
        families: &[&str],
    ) -> Person {
        Person {
            handle: handle.into(),
            id: handle.to_uppercase(),
            gender,
            primary_name: Name {
                first_name: handle.into(),
                surname: "Lund".into(),
                name_type: NameType::Birth,
            },
            event_refs: events
                .iter()
                .map(|e| EventRef { event: e.to_string(), role: EventRole::Primary })
                .collect(),
            parent_families: parents.iter().map(|s| s.to_string()).collect(),
            families: families.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn event(handle: &str, event_type: EventType, y: i32, m: u32, d: u32) -> Event {
        Event {
            handle: handle.into(),
            id: handle.to_uppercase(),
            event_type,
            date: Some(Date::new(y, m, d)),
        }
    }

    fn today() -> i32 {
        day_number(2024, 1, 1)
    }

    fn messages(result: &ScanResult, object_id: &str) -> Vec<String> {
        result
            .violations
            .iter()
            .filter(|v| v.object_id == object_id)
            .map(|v| v.message.clone())
            .collect()
    }

    #[test]
    fn death_before_birth_reported_once() {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_event(event("b", EventType::Birth, 1900, 5, 1));
        db.insert_event(event("d", EventType::Death, 1899, 5, 1));
        db.insert_person(person("p", Gender::Male, &["d", "b"], &[], &[]));

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        let found = messages(&result, "P");
        assert_eq!(found.iter().filter(|m| *m == "Death before birth").count(), 1);
        assert!(found.contains(&"Disconnected individual".to_string()));
        assert_eq!(result.people_checked, 1);
    }

    #[test]
    fn disconnected_individual_only() {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_person(person("p", Gender::Female, &[], &[], &[]));

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(messages(&result, "P"), vec!["Disconnected individual".to_string()]);
    }

    fn couple_db() -> MemoryDatabase {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_person(person("dad", Gender::Male, &[], &[], &["f1"]));
        db.insert_person(person("mom", Gender::Female, &[], &[], &["f1"]));
        db.insert_family(Family {
            handle: "f1".into(),
            id: "F1".into(),
            father: Some("dad".into()),
            mother: Some("mom".into()),
            child_refs: vec![],
            event_refs: vec![],
            relationship: FamilyRelation::Married,
        });
        db
    }

    #[test]
    fn family_checked_once_with_its_spouses() {
        let db = couple_db();
        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();

        assert_eq!(result.families_checked, 1);
        assert_eq!(result.people_checked, 2);
        // both spouses share a birth surname
        assert_eq!(
            messages(&result, "F1"),
            vec!["Husband and wife with the same surname".to_string()]
        );
    }

    #[test]
    fn orphan_families_still_checked() {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_family(Family {
            handle: "f9".into(),
            id: "F9".into(),
            father: None,
            mother: None,
            child_refs: vec![],
            event_refs: vec![],
            relationship: FamilyRelation::Unknown,
        });

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(result.families_checked, 1);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn broken_records_are_skipped_and_logged() {
        let mut db = couple_db();
        db.insert_person(person("lost", Gender::Male, &["nowhere"], &[], &[]));
        db.insert_family(Family {
            handle: "f2".into(),
            id: "F2".into(),
            father: Some("ghost".into()),
            mother: None,
            child_refs: vec![ChildRef {
                child: "dad".into(),
                father_relation: Default::default(),
                mother_relation: Default::default(),
            }],
            event_refs: vec![],
            relationship: FamilyRelation::Married,
        });

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.people_checked, 2);
        assert_eq!(result.families_checked, 1);
    }

    #[test]
    fn identical_runs_give_identical_results() {
        let mut db = couple_db();
        db.insert_event(event("b", EventType::Birth, 1800, 1, 1));
        db.insert_person(person("old", Gender::Unknown, &["b"], &[], &[]));

        let first = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        let second = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(first.violations, second.violations);
        assert!(!first.violations.is_empty());
    }

    #[test]
    fn dangling_child_does_not_hide_its_relatives() {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_event(event("db", EventType::Birth, 1900, 5, 1));
        db.insert_event(event("dd", EventType::Death, 1899, 5, 1));
        db.insert_event(event("cb", EventType::Birth, 1930, 5, 1));
        db.insert_event(event("cd", EventType::Death, 1929, 5, 1));
        db.insert_person(person("dad", Gender::Male, &["dd", "db"], &[], &["f1"]));
        db.insert_person(person("c1", Gender::Female, &["cd", "cb"], &["f1"], &[]));
        db.insert_family(Family {
            handle: "f1".into(),
            id: "F1".into(),
            father: Some("dad".into()),
            mother: None,
            child_refs: ["c1", "ghost"]
                .iter()
                .map(|c| ChildRef {
                    child: c.to_string(),
                    father_relation: Default::default(),
                    mother_relation: Default::default(),
                })
                .collect(),
            event_refs: vec![],
            relationship: FamilyRelation::Married,
        });

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(result.people_checked, 2);
        assert_eq!(result.families_checked, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].contains("ghost"));
        assert!(messages(&result, "DAD").contains(&"Death before birth".to_string()));
        assert!(messages(&result, "C1").contains(&"Death before birth".to_string()));
    }

    /// Wraps a database and fails every lookup of one person with an io error.
    struct FailingStorage {
        inner: MemoryDatabase,
        broken: &'static str,
    }

    impl Database for FailingStorage {
        fn person(&self, handle: &str) -> Result<Person> {
            if handle == self.broken {
                return Err(VerifyError::Io(std::io::Error::other("disk gone")));
            }
            self.inner.person(handle)
        }
        fn family(&self, handle: &str) -> Result<Family> {
            self.inner.family(handle)
        }
        fn event(&self, handle: &str) -> Result<Event> {
            self.inner.event(handle)
        }
        fn person_handles(&self) -> Result<Vec<Handle>> {
            self.inner.person_handles()
        }
        fn family_handles(&self) -> Result<Vec<Handle>> {
            self.inner.family_handles()
        }
        fn person_count(&self) -> Result<usize> {
            self.inner.person_count()
        }
        fn family_count(&self) -> Result<usize> {
            self.inner.family_count()
        }
        fn save_path(&self) -> &std::path::Path {
            self.inner.save_path()
        }
    }

    #[test]
    fn storage_failure_aborts_the_scan() {
        let db = FailingStorage { inner: couple_db(), broken: "mom" };
        let outcome = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress);
        assert!(matches!(outcome, Err(VerifyError::Io(_))));
    }

    #[test]
    fn cache_figures_are_reported() {
        let db = couple_db();
        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(result.cache_misses, 3);
        assert!(result.cache_hits > 0);
    }

    struct StopAfter(usize, usize);

    impl Progress for StopAfter {
        fn set_total(&mut self, _total: usize) {}
        fn tick(&mut self) {
            self.1 += 1;
        }
        fn is_cancelled(&self) -> bool {
            self.1 >= self.0
        }
    }

    #[test]
    fn cancellation_stops_early() {
        let mut db = MemoryDatabase::new("scan.json");
        for i in 0..5 {
            db.insert_person(person(&format!("p{i}"), Gender::Male, &[], &[], &[]));
        }

        let mut progress = StopAfter(2, 0);
        let result = run_at(&db, &VerifyOptions::default(), today(), &mut progress).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.people_checked, 2);
    }

    #[test]
    fn counts_by_severity() {
        let mut db = MemoryDatabase::new("scan.json");
        db.insert_event(event("b", EventType::Birth, 1900, 5, 1));
        db.insert_event(event("d", EventType::Death, 1899, 5, 1));
        db.insert_person(person("p", Gender::Male, &["d", "b"], &[], &[]));

        let result = run_at(&db, &VerifyOptions::default(), today(), &mut NoProgress).unwrap();
        assert_eq!(result.errors(), 1);
        assert_eq!(result.warnings(), result.violations.len() - 1);
    }
}
