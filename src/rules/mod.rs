//! The rule catalog.
//!
//! A rule is a pure predicate over one subject: a person (with the families
//! and siblings it needs) or a family (with its parents and children). Rules
//! never touch the database; subjects are assembled from cached snapshots by
//! the scan context.

pub mod family;
pub mod person;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::VerifyOptions;
use crate::model::{ChildRef, Handle};
use crate::snapshot::{FamilySnapshot, PersonSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Single letter used in plain output.
    pub fn letter(&self) -> char {
        match self {
            Severity::Error => 'E',
            Severity::Warning => 'W',
        }
    }
}

/// Identity of a rule for the ignore list: its number plus its parameters.
/// The same rule run with a different threshold is a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey {
    pub id: u32,
    pub params: Vec<i64>,
}

impl RuleKey {
    pub fn new(id: u32, params: Vec<i64>) -> Self {
        RuleKey { id, params }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.id, params.join(","))
    }
}

/// Which party a family rule blames. Person rules always blame the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Culprit {
    Subject,
    Father,
    Mother,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Broken(Culprit),
}

impl Verdict {
    pub fn broken_if(condition: bool) -> Self {
        if condition {
            Verdict::Broken(Culprit::Subject)
        } else {
            Verdict::Passed
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, Verdict::Broken(_))
    }
}

pub trait Rule {
    fn id(&self) -> u32;
    fn severity(&self) -> Severity;

    /// Thresholds and switches that change what the rule reports.
    fn params(&self) -> Vec<i64> {
        Vec::new()
    }

    fn message(&self, culprit: Culprit) -> &'static str;

    fn key(&self) -> RuleKey {
        RuleKey::new(self.id(), self.params())
    }
}

pub trait PersonRule: Rule {
    fn check(&self, subject: &PersonSubject) -> Verdict;
}

pub trait FamilyRule: Rule {
    fn check(&self, subject: &FamilySubject) -> Verdict;
}

/// A spousal family of the subject with its children resolved.
#[derive(Debug, Clone)]
pub struct SpouseFamily {
    pub family: Rc<FamilySnapshot>,
    pub children: Vec<Rc<PersonSnapshot>>,
}

#[derive(Debug, Clone)]
pub struct PersonSubject {
    pub person: Rc<PersonSnapshot>,
    pub families: Vec<SpouseFamily>,
    /// Children of the person's parent families, the person excluded.
    pub siblings: Vec<Rc<PersonSnapshot>>,
    pub today: i32,
}

impl PersonSubject {
    /// A person on their own, as if nobody else were in the database.
    pub fn alone(person: PersonSnapshot, today: i32) -> Self {
        PersonSubject {
            person: Rc::new(person),
            families: Vec::new(),
            siblings: Vec::new(),
            today,
        }
    }

    pub fn children_count(&self) -> usize {
        self.families.iter().map(|f| f.family.child_refs.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct FamilySubject {
    pub family: Rc<FamilySnapshot>,
    /// `PersonSnapshot::empty()` when the family has no father.
    pub father: Rc<PersonSnapshot>,
    pub mother: Rc<PersonSnapshot>,
    pub children: Vec<(ChildRef, Rc<PersonSnapshot>)>,
}

impl FamilySubject {
    pub fn birth_dates(&self, estimate: bool) -> Vec<i32> {
        self.children
            .iter()
            .map(|(_, child)| child.birth_date(estimate))
            .filter(|d| *d > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Person,
    Family,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Person => write!(f, "Person"),
            ObjectKind::Family => write!(f, "Family"),
        }
    }
}

/// One broken rule on one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub message: String,
    pub object_id: String,
    pub name: String,
    pub kind: ObjectKind,
    pub rule: RuleKey,
    pub severity: Severity,
    pub handle: Handle,
}

impl Violation {
    pub fn for_person(rule: &dyn PersonRule, culprit: Culprit, person: &PersonSnapshot) -> Self {
        Violation {
            message: rule.message(culprit).to_string(),
            object_id: person.id.clone(),
            name: person.name.clone(),
            kind: ObjectKind::Person,
            rule: rule.key(),
            severity: rule.severity(),
            handle: person.handle.clone(),
        }
    }

    pub fn for_family(rule: &dyn FamilyRule, culprit: Culprit, family: &FamilySnapshot) -> Self {
        Violation {
            message: rule.message(culprit).to_string(),
            object_id: family.id.clone(),
            name: family.name.clone(),
            kind: ObjectKind::Family,
            rule: rule.key(),
            severity: rule.severity(),
            handle: family.handle.clone(),
        }
    }
}

pub(crate) fn flag(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn threshold(value: u32) -> i64 {
    i64::from(value)
}

/// Every person rule, configured from the options.
pub fn person_rules(options: &VerifyOptions) -> Vec<Box<dyn PersonRule>> {
    use person::*;

    let est = options.estimate_age;
    vec![
        Box::new(BirthAfterBaptism),
        Box::new(DeathBeforeBaptism),
        Box::new(BirthAfterBurial),
        Box::new(DeathAfterBurial),
        Box::new(BirthAfterDeath),
        Box::new(BaptismAfterBurial),
        Box::new(OldAge { max_age: options.oldage, estimate: est }),
        Box::new(OldAgeButNoDeath { max_age: options.oldage, estimate: est }),
        Box::new(UnknownGender),
        Box::new(MultipleParents),
        Box::new(MarriedOften { max_spouses: options.wedder }),
        Box::new(OldUnmarried { max_age: options.oldunm, estimate: est }),
        Box::new(TooManyChildren {
            max_for_father: options.mxchilddad,
            max_for_mother: options.mxchildmom,
        }),
        Box::new(Disconnected),
        Box::new(InvalidBirthDate { enabled: options.invdate }),
        Box::new(InvalidDeathDate { enabled: options.invdate }),
        Box::new(BirthEqualsDeath),
        Box::new(BirthEqualsMarriage),
        Box::new(DeathEqualsMarriage),
        Box::new(BaptismTooLate { estimate: est }),
        Box::new(BurialTooLate { estimate: est }),
        Box::new(FamilyOrder),
        Box::new(UnknownRoleEvents),
        Box::new(EventsOutOfOrder),
    ]
}

/// Every family rule, configured from the options.
pub fn family_rules(options: &VerifyOptions) -> Vec<Box<dyn FamilyRule>> {
    use family::*;

    let est = options.estimate_age;
    vec![
        Box::new(SameSexFamily),
        Box::new(FemaleHusband),
        Box::new(MaleWife),
        Box::new(SameSurnameFamily),
        Box::new(LargeAgeGap { max_years: options.hwdif, estimate: est }),
        Box::new(MarriageBeforeBirth { estimate: est }),
        Box::new(MarriageAfterDeath { estimate: est }),
        Box::new(EarlyMarriage { min_age: options.yngmar, estimate: est }),
        Box::new(LateMarriage { max_age: options.oldmar, estimate: est }),
        Box::new(OldParent {
            max_mother: options.oldmom,
            max_father: options.olddad,
            estimate: est,
        }),
        Box::new(YoungParent {
            min_mother: options.yngmom,
            min_father: options.yngdad,
            estimate: est,
        }),
        Box::new(UnbornParent { estimate: est }),
        Box::new(DeadParent { estimate: est }),
        Box::new(LargeChildrenSpan { max_years: options.cbspan, estimate: est }),
        Box::new(LargeChildrenAgeDiff { max_years: options.cspace, estimate: est }),
        Box::new(MarriedRelation),
        Box::new(ChildrenOrder),
        Box::new(FamilyUnknownRoleEvents),
        Box::new(FamilyEventsOutOfOrder),
    ]
}
