//! Person rules.
//!
//! Ordering rules (birth before baptism and so on) use exact dates only: a
//! date missing its day or month is 0 and never fires. Age rules honour the
//! "estimate" option and fall back to baptism/burial when estimating.

use super::{flag, threshold, Culprit, PersonRule, PersonSubject, Rule, Severity, Verdict};
use crate::date::exceeds_years;
use crate::model::Gender;

/// Slack on top of the family's usual baptism delay.
const BAPTISM_SLACK_DAYS: i32 = 120;
const MIN_SIBLINGS_FOR_BASELINE: usize = 2;
const MAX_BURIAL_DELAY_DAYS: i32 = 14;

/// `later` is strictly before `earlier`, both known.
fn reversed(earlier: i32, later: i32) -> bool {
    earlier > 0 && later > 0 && earlier > later
}

fn same_day(a: i32, b: i32) -> bool {
    a > 0 && b > 0 && a == b
}

pub struct BirthAfterBaptism;

impl Rule for BirthAfterBaptism {
    fn id(&self) -> u32 {
        1
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Baptism before birth"
    }
}

impl PersonRule for BirthAfterBaptism {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.birth_date(false), s.person.baptism_date(false)))
    }
}

pub struct DeathBeforeBaptism;

impl Rule for DeathBeforeBaptism {
    fn id(&self) -> u32 {
        2
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Death before baptism"
    }
}

impl PersonRule for DeathBeforeBaptism {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.baptism_date(false), s.person.death_date(false)))
    }
}

pub struct BirthAfterBurial;

impl Rule for BirthAfterBurial {
    fn id(&self) -> u32 {
        3
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Burial before birth"
    }
}

impl PersonRule for BirthAfterBurial {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.birth_date(false), s.person.burial_date(false)))
    }
}

pub struct DeathAfterBurial;

impl Rule for DeathAfterBurial {
    fn id(&self) -> u32 {
        4
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Burial before death"
    }
}

impl PersonRule for DeathAfterBurial {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.death_date(false), s.person.burial_date(false)))
    }
}

pub struct BirthAfterDeath;

impl Rule for BirthAfterDeath {
    fn id(&self) -> u32 {
        5
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Death before birth"
    }
}

impl PersonRule for BirthAfterDeath {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.birth_date(false), s.person.death_date(false)))
    }
}

pub struct BaptismAfterBurial;

impl Rule for BaptismAfterBurial {
    fn id(&self) -> u32 {
        6
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Burial before baptism"
    }
}

impl PersonRule for BaptismAfterBurial {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(reversed(s.person.baptism_date(false), s.person.burial_date(false)))
    }
}

pub struct OldAge {
    pub max_age: u32,
    pub estimate: bool,
}

impl Rule for OldAge {
    fn id(&self) -> u32 {
        7
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_age), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Old age at death"
    }
}

impl PersonRule for OldAge {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(exceeds_years(s.person.age_at_death(self.estimate), self.max_age))
    }
}

pub struct UnknownGender;

impl Rule for UnknownGender {
    fn id(&self) -> u32 {
        8
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Unknown gender"
    }
}

impl PersonRule for UnknownGender {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.gender == Gender::Unknown)
    }
}

pub struct MultipleParents;

impl Rule for MultipleParents {
    fn id(&self) -> u32 {
        9
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Multiple parents"
    }
}

impl PersonRule for MultipleParents {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.parent_families.len() > 1)
    }
}

pub struct MarriedOften {
    pub max_spouses: u32,
}

impl Rule for MarriedOften {
    fn id(&self) -> u32 {
        10
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_spouses)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Married often"
    }
}

impl PersonRule for MarriedOften {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.families.len() > self.max_spouses as usize)
    }
}

pub struct OldUnmarried {
    pub max_age: u32,
    pub estimate: bool,
}

impl Rule for OldUnmarried {
    fn id(&self) -> u32 {
        11
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_age), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Old and unmarried"
    }
}

impl PersonRule for OldUnmarried {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(
            s.person.families.is_empty()
                && exceeds_years(s.person.age_at_death(self.estimate), self.max_age),
        )
    }
}

pub struct TooManyChildren {
    pub max_for_father: u32,
    pub max_for_mother: u32,
}

impl Rule for TooManyChildren {
    fn id(&self) -> u32 {
        12
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_for_father), threshold(self.max_for_mother)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Too many children"
    }
}

impl PersonRule for TooManyChildren {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let count = s.children_count();
        let limit = match s.person.gender {
            Gender::Male => self.max_for_father,
            Gender::Female => self.max_for_mother,
            Gender::Unknown => return Verdict::Passed,
        };
        Verdict::broken_if(count > limit as usize)
    }
}

pub struct Disconnected;

impl Rule for Disconnected {
    fn id(&self) -> u32 {
        28
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Disconnected individual"
    }
}

impl PersonRule for Disconnected {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.parent_families.is_empty() && s.person.families.is_empty())
    }
}

pub struct InvalidBirthDate {
    pub enabled: bool,
}

impl Rule for InvalidBirthDate {
    fn id(&self) -> u32 {
        29
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Invalid birth date"
    }
}

impl PersonRule for InvalidBirthDate {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(self.enabled && !s.person.birth_valid)
    }
}

pub struct InvalidDeathDate {
    pub enabled: bool,
}

impl Rule for InvalidDeathDate {
    fn id(&self) -> u32 {
        30
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Invalid death date"
    }
}

impl PersonRule for InvalidDeathDate {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(self.enabled && !s.person.death_valid)
    }
}

/// Born long enough ago to be dead, but nothing says so.
pub struct OldAgeButNoDeath {
    pub max_age: u32,
    pub estimate: bool,
}

impl Rule for OldAgeButNoDeath {
    fn id(&self) -> u32 {
        32
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_age), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Old age but no death"
    }
}

impl PersonRule for OldAgeButNoDeath {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let birth = s.person.birth_date(self.estimate);
        // a death or burial of any precision counts as "shown as dead"
        if s.person.has_death_ref || s.person.death_date(true) != 0 || birth == 0 {
            return Verdict::Passed;
        }
        Verdict::broken_if(exceeds_years(s.today - birth, self.max_age))
    }
}

pub struct BirthEqualsDeath;

impl Rule for BirthEqualsDeath {
    fn id(&self) -> u32 {
        33
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Birth equals death"
    }
}

impl PersonRule for BirthEqualsDeath {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(same_day(s.person.birth_date(false), s.person.death_date(false)))
    }
}

pub struct BirthEqualsMarriage;

impl Rule for BirthEqualsMarriage {
    fn id(&self) -> u32 {
        34
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Birth equals marriage"
    }
}

impl PersonRule for BirthEqualsMarriage {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let birth = s.person.birth_date(false);
        Verdict::broken_if(
            s.families
                .iter()
                .any(|f| same_day(birth, f.family.marriage_date())),
        )
    }
}

pub struct DeathEqualsMarriage;

impl Rule for DeathEqualsMarriage {
    fn id(&self) -> u32 {
        35
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Death equals marriage"
    }
}

impl PersonRule for DeathEqualsMarriage {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let death = s.person.death_date(false);
        Verdict::broken_if(
            s.families
                .iter()
                .any(|f| same_day(death, f.family.marriage_date())),
        )
    }
}

/// Baptised much later than the siblings usually were.
pub struct BaptismTooLate {
    pub estimate: bool,
}

impl BaptismTooLate {
    fn delay(&self, birth: i32, baptism: i32) -> Option<i32> {
        (birth > 0 && baptism > 0 && baptism >= birth).then(|| baptism - birth)
    }
}

impl Rule for BaptismTooLate {
    fn id(&self) -> u32 {
        36
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Baptism too late"
    }
}

impl PersonRule for BaptismTooLate {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let est = self.estimate;
        let Some(own) = self.delay(s.person.birth.get(est), s.person.baptism.get(est)) else {
            return Verdict::Passed;
        };

        let mut delays: Vec<i32> = s
            .siblings
            .iter()
            .filter_map(|sib| self.delay(sib.birth.get(est), sib.baptism.get(est)))
            .collect();
        if delays.len() < MIN_SIBLINGS_FOR_BASELINE {
            return Verdict::Passed;
        }

        Verdict::broken_if(own > median(&mut delays) + BAPTISM_SLACK_DAYS)
    }
}

fn median(values: &mut [i32]) -> i32 {
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2
    } else {
        values[mid]
    }
}

pub struct BurialTooLate {
    pub estimate: bool,
}

impl Rule for BurialTooLate {
    fn id(&self) -> u32 {
        37
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Burial too late"
    }
}

impl PersonRule for BurialTooLate {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let death = s.person.death.get(self.estimate);
        let burial = s.person.burial.get(self.estimate);
        Verdict::broken_if(death > 0 && burial > 0 && burial - death > MAX_BURIAL_DELAY_DAYS)
    }
}

/// Spousal families should be listed oldest first.
pub struct FamilyOrder;

impl Rule for FamilyOrder {
    fn id(&self) -> u32 {
        38
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Family events are not in chronological order"
    }
}

impl PersonRule for FamilyOrder {
    fn check(&self, s: &PersonSubject) -> Verdict {
        let keys: Vec<i32> = s
            .families
            .iter()
            .map(|f| {
                let family = &f.family;
                if family.marriage_date() > 0 {
                    family.marriage_date()
                } else if family.divorce_date() > 0 {
                    family.divorce_date()
                } else {
                    f.children
                        .iter()
                        .map(|c| c.birth.estimate)
                        .filter(|d| *d > 0)
                        .min()
                        .unwrap_or(0)
                }
            })
            .filter(|k| *k > 0)
            .collect();

        Verdict::broken_if(keys.windows(2).any(|w| w[0] > w[1]))
    }
}

pub struct UnknownRoleEvents;

impl Rule for UnknownRoleEvents {
    fn id(&self) -> u32 {
        39
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Person has events with unknown role"
    }
}

impl PersonRule for UnknownRoleEvents {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.has_unknown_role_event)
    }
}

pub struct EventsOutOfOrder;

impl Rule for EventsOutOfOrder {
    fn id(&self) -> u32 {
        40
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Person events are not in chronological order"
    }
}

impl PersonRule for EventsOutOfOrder {
    fn check(&self, s: &PersonSubject) -> Verdict {
        Verdict::broken_if(s.person.events_out_of_order)
    }
}
