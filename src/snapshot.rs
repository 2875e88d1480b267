//! Flattened, comparison-ready views of people and families.
//!
//! A snapshot is built once from the live record and never changes. Dates are
//! held as sort values in two forms: `exact` is 0 unless day and month are
//! known, `estimate` is the full sort value of whatever was entered.

use crate::db::Database;
use crate::error::Result;
use crate::model::{
    ChildRef, Date, Event, EventRef, EventRole, EventType, Family, FamilyRelation, Gender, Handle,
    NameType, Person,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatePair {
    pub exact: i32,
    pub estimate: i32,
}

impl DatePair {
    pub fn from_date(date: Option<&Date>) -> Self {
        match date {
            Some(date) => {
                let value = date.sort_value();
                DatePair {
                    exact: if date.is_exact() { value } else { 0 },
                    estimate: value,
                }
            }
            None => DatePair::default(),
        }
    }

    pub fn get(&self, estimate: bool) -> i32 {
        if estimate {
            self.estimate
        } else {
            self.exact
        }
    }

    pub fn is_set(&self) -> bool {
        self.estimate != 0
    }
}

/// Tracks whether dated events appear in chronological order.
#[derive(Default)]
struct OrderTracker {
    latest: i32,
    out_of_order: bool,
}

impl OrderTracker {
    fn see(&mut self, value: i32) {
        if value == 0 {
            return;
        }
        if value < self.latest {
            self.out_of_order = true;
        }
        self.latest = self.latest.max(value);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonSnapshot {
    pub handle: Handle,
    pub id: String,
    pub name: String,
    pub surname: String,
    pub has_birth_name: bool,
    pub gender: Gender,
    pub birth: DatePair,
    pub death: DatePair,
    pub baptism: DatePair,
    pub burial: DatePair,
    pub has_death_ref: bool,
    pub birth_valid: bool,
    pub death_valid: bool,
    pub has_unknown_role_event: bool,
    pub events_out_of_order: bool,
    pub parent_families: Vec<Handle>,
    pub families: Vec<Handle>,
}

impl PersonSnapshot {
    /// Stand-in for an absent father or mother: nothing known, nothing fires.
    pub fn empty() -> Self {
        PersonSnapshot {
            birth_valid: true,
            death_valid: true,
            ..PersonSnapshot::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    pub fn extract(db: &dyn Database, person: &Person) -> Result<Self> {
        let mut snap = PersonSnapshot {
            handle: person.handle.clone(),
            id: person.id.clone(),
            name: person.primary_name.display(),
            surname: person.primary_name.surname.clone(),
            has_birth_name: person.primary_name.name_type == NameType::Birth,
            gender: person.gender,
            birth_valid: true,
            death_valid: true,
            parent_families: person.parent_families.clone(),
            families: person.families.clone(),
            ..PersonSnapshot::default()
        };

        let mut order = OrderTracker::default();
        let mut christening: Option<DatePair> = None;
        let mut seen_birth = false;
        let mut seen_death = false;
        let mut seen_baptism = false;
        let mut seen_burial = false;

        for (event_ref, event) in resolve_events(db, &person.event_refs)? {
            if event_ref.role == EventRole::Unknown {
                snap.has_unknown_role_event = true;
                continue;
            }
            if event_ref.role != EventRole::Primary {
                continue;
            }

            let dates = DatePair::from_date(event.date.as_ref());
            order.see(dates.estimate);

            match event.event_type {
                EventType::Birth if !seen_birth => {
                    seen_birth = true;
                    snap.birth = dates;
                    snap.birth_valid = event.date.map_or(true, |d| d.is_valid());
                }
                EventType::Death if !seen_death => {
                    seen_death = true;
                    snap.has_death_ref = true;
                    snap.death = dates;
                    snap.death_valid = event.date.map_or(true, |d| d.is_valid());
                }
                EventType::Baptism if !seen_baptism => {
                    seen_baptism = true;
                    snap.baptism = dates;
                }
                EventType::Christening if christening.is_none() => {
                    christening = Some(dates);
                }
                EventType::Burial if !seen_burial => {
                    seen_burial = true;
                    snap.burial = dates;
                }
                _ => {}
            }
        }

        // baptism takes precedence over christening
        if !seen_baptism {
            if let Some(dates) = christening {
                snap.baptism = dates;
            }
        }

        snap.events_out_of_order = order.out_of_order;
        Ok(snap)
    }

    /// Birth date, or the baptism date in its place when estimating.
    pub fn birth_date(&self, estimate: bool) -> i32 {
        let value = self.birth.get(estimate);
        if estimate && value == 0 {
            self.baptism.get(estimate)
        } else {
            value
        }
    }

    /// Death date, or the burial date in its place when estimating.
    pub fn death_date(&self, estimate: bool) -> i32 {
        let value = self.death.get(estimate);
        if estimate && value == 0 {
            self.burial.get(estimate)
        } else {
            value
        }
    }

    pub fn baptism_date(&self, estimate: bool) -> i32 {
        self.baptism.get(estimate)
    }

    pub fn burial_date(&self, estimate: bool) -> i32 {
        self.burial.get(estimate)
    }

    /// Days between birth and death, 0 when either is unknown.
    pub fn age_at_death(&self, estimate: bool) -> i32 {
        let birth = self.birth_date(estimate);
        let death = self.death_date(estimate);
        if birth > 0 && death > 0 {
            death - birth
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilySnapshot {
    pub handle: Handle,
    pub id: String,
    pub name: String,
    pub marriage: DatePair,
    pub divorce: DatePair,
    pub father: Option<Handle>,
    pub mother: Option<Handle>,
    pub child_refs: Vec<ChildRef>,
    pub relationship: FamilyRelation,
    pub has_unknown_role_event: bool,
    pub events_out_of_order: bool,
}

impl FamilySnapshot {
    pub fn extract(db: &dyn Database, family: &Family) -> Result<Self> {
        let father_name = match &family.father {
            Some(handle) => Some(db.person(handle)?.primary_name.display()),
            None => None,
        };
        let mother_name = match &family.mother {
            Some(handle) => Some(db.person(handle)?.primary_name.display()),
            None => None,
        };

        let mut snap = FamilySnapshot {
            handle: family.handle.clone(),
            id: family.id.clone(),
            name: family_name(father_name.as_deref(), mother_name.as_deref()),
            father: family.father.clone(),
            mother: family.mother.clone(),
            child_refs: family.child_refs.clone(),
            relationship: family.relationship,
            ..FamilySnapshot::default()
        };

        let mut order = OrderTracker::default();
        let mut seen_marriage = false;
        let mut seen_divorce = false;

        for (event_ref, event) in resolve_events(db, &family.event_refs)? {
            if event_ref.role == EventRole::Unknown {
                snap.has_unknown_role_event = true;
                continue;
            }
            if !matches!(event_ref.role, EventRole::Family | EventRole::Primary) {
                continue;
            }

            let dates = DatePair::from_date(event.date.as_ref());
            order.see(dates.estimate);

            match event.event_type {
                EventType::Marriage if !seen_marriage => {
                    seen_marriage = true;
                    snap.marriage = dates;
                }
                EventType::Divorce if !seen_divorce => {
                    seen_divorce = true;
                    snap.divorce = dates;
                }
                _ => {}
            }
        }

        snap.events_out_of_order = order.out_of_order;
        Ok(snap)
    }

    /// Full sort value of the marriage; partial dates still count here.
    pub fn marriage_date(&self) -> i32 {
        self.marriage.estimate
    }

    pub fn divorce_date(&self) -> i32 {
        self.divorce.estimate
    }
}

fn resolve_events<'a>(
    db: &dyn Database,
    refs: &'a [EventRef],
) -> Result<Vec<(&'a EventRef, Event)>> {
    refs.iter()
        .map(|event_ref| Ok((event_ref, db.event(&event_ref.event)?)))
        .collect()
}

/// "Father and Mother", or whichever parent is known.
pub fn family_name(father: Option<&str>, mother: Option<&str>) -> String {
    match (father, mother) {
        (Some(f), Some(m)) => format!("{f} and {m}"),
        (Some(f), None) => f.to_string(),
        (None, Some(m)) => m.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::day_number;
    use crate::db::MemoryDatabase;
    use crate::error::VerifyError;
    use crate::model::Name;

    fn event(db: &mut MemoryDatabase, handle: &str, event_type: EventType, date: Option<Date>) {
        db.insert_event(Event {
            handle: handle.into(),
            id: handle.to_uppercase(),
            event_type,
            date,
        });
    }

    fn primary(handle: &str) -> EventRef {
        EventRef { event: handle.into(), role: EventRole::Primary }
    }

    fn person(refs: Vec<EventRef>) -> Person {
        Person {
            handle: "p1".into(),
            id: "I0001".into(),
            gender: Gender::Female,
            primary_name: Name {
                first_name: "Ada".into(),
                surname: "Holm".into(),
                name_type: NameType::Birth,
            },
            event_refs: refs,
            parent_families: vec!["f0".into()],
            families: vec![],
        }
    }

    #[test]
    fn exact_and_estimate_values() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "b", EventType::Birth, Some(Date::new(1900, 0, 0)));
        event(&mut db, "d", EventType::Death, Some(Date::new(1970, 6, 2)));

        let snap = PersonSnapshot::extract(&db, &person(vec![primary("b"), primary("d")])).unwrap();

        assert_eq!(snap.birth.exact, 0);
        assert_eq!(snap.birth.estimate, day_number(1900, 1, 1));
        assert_eq!(snap.death.exact, day_number(1970, 6, 2));
        assert!(snap.has_death_ref);
        assert_eq!(snap.name, "Holm, Ada");
        assert!(snap.has_birth_name);
    }

    #[test]
    fn unknown_role_is_flagged_and_skipped() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "b", EventType::Birth, Some(Date::new(1900, 1, 1)));
        let refs = vec![EventRef { event: "b".into(), role: EventRole::Unknown }];

        let snap = PersonSnapshot::extract(&db, &person(refs)).unwrap();
        assert!(snap.has_unknown_role_event);
        assert_eq!(snap.birth, DatePair::default());
    }

    #[test]
    fn out_of_order_events_flagged() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "d", EventType::Death, Some(Date::new(1950, 1, 1)));
        event(&mut db, "o", EventType::Other, None);
        event(&mut db, "b", EventType::Birth, Some(Date::new(1900, 1, 1)));

        let refs = vec![primary("d"), primary("o"), primary("b")];
        let snap = PersonSnapshot::extract(&db, &person(refs)).unwrap();
        assert!(snap.events_out_of_order);

        let refs = vec![primary("b"), primary("o"), primary("d")];
        let snap = PersonSnapshot::extract(&db, &person(refs)).unwrap();
        assert!(!snap.events_out_of_order);
    }

    #[test]
    fn baptism_beats_christening() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "c", EventType::Christening, Some(Date::new(1900, 1, 5)));
        event(&mut db, "bp", EventType::Baptism, Some(Date::new(1900, 1, 9)));

        let refs = vec![primary("c"), primary("bp")];
        let snap = PersonSnapshot::extract(&db, &person(refs)).unwrap();
        assert_eq!(snap.baptism.exact, day_number(1900, 1, 9));

        let snap = PersonSnapshot::extract(&db, &person(vec![primary("c")])).unwrap();
        assert_eq!(snap.baptism.exact, day_number(1900, 1, 5));
    }

    #[test]
    fn text_only_birth_is_invalid() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "b", EventType::Birth, Some(Date::text()));

        let snap = PersonSnapshot::extract(&db, &person(vec![primary("b")])).unwrap();
        assert!(!snap.birth_valid);
        assert!(snap.death_valid);
    }

    #[test]
    fn estimates_fall_back_to_baptism_and_burial() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "bp", EventType::Baptism, Some(Date::new(1900, 2, 1)));
        event(&mut db, "bu", EventType::Burial, Some(Date::new(1960, 2, 1)));

        let refs = vec![primary("bp"), primary("bu")];
        let snap = PersonSnapshot::extract(&db, &person(refs)).unwrap();
        assert_eq!(snap.birth_date(false), 0);
        assert_eq!(snap.birth_date(true), day_number(1900, 2, 1));
        assert_eq!(snap.death_date(true), day_number(1960, 2, 1));
        assert!(!snap.has_death_ref);
        assert_eq!(snap.age_at_death(false), 0);
        assert!(snap.age_at_death(true) > 0);
    }

    #[test]
    fn dangling_event_is_an_error() {
        let db = MemoryDatabase::new("t.json");
        let err = PersonSnapshot::extract(&db, &person(vec![primary("gone")])).unwrap_err();
        assert!(matches!(err, VerifyError::MissingEvent(_)));
    }

    #[test]
    fn empty_snapshot_has_nothing() {
        let snap = PersonSnapshot::empty();
        assert!(snap.is_empty());
        assert_eq!(snap.birth_date(true), 0);
        assert_eq!(snap.gender, Gender::Unknown);
    }

    #[test]
    fn family_marriage_and_name() {
        let mut db = MemoryDatabase::new("t.json");
        event(&mut db, "m", EventType::Marriage, Some(Date::new(1925, 5, 0)));
        let mut father = person(vec![]);
        father.handle = "dad".into();
        father.primary_name = Name {
            first_name: "Per".into(),
            surname: "Holm".into(),
            name_type: NameType::Birth,
        };
        db.insert_person(father);

        let family = Family {
            handle: "f1".into(),
            id: "F0001".into(),
            father: Some("dad".into()),
            mother: None,
            child_refs: vec![],
            event_refs: vec![EventRef { event: "m".into(), role: EventRole::Family }],
            relationship: FamilyRelation::Married,
        };

        let snap = FamilySnapshot::extract(&db, &family).unwrap();
        assert_eq!(snap.marriage_date(), day_number(1925, 5, 1));
        assert_eq!(snap.marriage.exact, 0);
        assert_eq!(snap.name, "Holm, Per");
    }

    #[test]
    fn family_with_dangling_parent_fails() {
        let db = MemoryDatabase::new("t.json");
        let family = Family {
            handle: "f1".into(),
            id: "F0001".into(),
            father: Some("ghost".into()),
            mother: None,
            child_refs: vec![],
            event_refs: vec![],
            relationship: FamilyRelation::Unknown,
        };
        assert!(matches!(
            FamilySnapshot::extract(&db, &family),
            Err(VerifyError::MissingPerson(_))
        ));
    }

    #[test]
    fn family_names() {
        assert_eq!(family_name(Some("A"), Some("B")), "A and B");
        assert_eq!(family_name(None, Some("B")), "B");
        assert_eq!(family_name(None, None), "");
    }
}
