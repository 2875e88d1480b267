//! Family rules.
//!
//! An absent father or mother is an empty snapshot, so every date check
//! against them sees 0 and passes. Rules that name a parent in their message
//! report which one through [`Culprit`].

use super::{flag, threshold, Culprit, FamilyRule, FamilySubject, Rule, Severity, Verdict};
use crate::date::{exceeds_years, short_of_years};
use crate::model::{ChildRelation, FamilyRelation, Gender};
use crate::snapshot::PersonSnapshot;

/// Gestation allowance for a father who died before the child was born.
const POSTHUMOUS_DAYS: i32 = 294;

fn known(date: i32) -> bool {
    date > 0
}

/// Blames the father first, then the mother.
fn blame(father: bool, mother: bool) -> Verdict {
    if father {
        Verdict::Broken(Culprit::Father)
    } else if mother {
        Verdict::Broken(Culprit::Mother)
    } else {
        Verdict::Passed
    }
}

fn parent_message(culprit: Culprit, father: &'static str, mother: &'static str) -> &'static str {
    match culprit {
        Culprit::Mother => mother,
        _ => father,
    }
}

pub struct SameSexFamily;

impl Rule for SameSexFamily {
    fn id(&self) -> u32 {
        13
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Same sex marriage"
    }
}

impl FamilyRule for SameSexFamily {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let (father, mother) = (&s.father, &s.mother);
        Verdict::broken_if(
            !father.is_empty()
                && !mother.is_empty()
                && mother.gender != Gender::Unknown
                && father.gender == mother.gender,
        )
    }
}

pub struct FemaleHusband;

impl Rule for FemaleHusband {
    fn id(&self) -> u32 {
        14
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Female husband"
    }
}

impl FamilyRule for FemaleHusband {
    fn check(&self, s: &FamilySubject) -> Verdict {
        Verdict::broken_if(s.father.gender == Gender::Female)
    }
}

pub struct MaleWife;

impl Rule for MaleWife {
    fn id(&self) -> u32 {
        15
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Male wife"
    }
}

impl FamilyRule for MaleWife {
    fn check(&self, s: &FamilySubject) -> Verdict {
        Verdict::broken_if(s.mother.gender == Gender::Male)
    }
}

/// Only birth names count; married names are expected to match.
pub struct SameSurnameFamily;

impl Rule for SameSurnameFamily {
    fn id(&self) -> u32 {
        16
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Husband and wife with the same surname"
    }
}

impl FamilyRule for SameSurnameFamily {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let (father, mother) = (&s.father, &s.mother);
        Verdict::broken_if(
            !father.is_empty()
                && !mother.is_empty()
                && father.has_birth_name
                && mother.has_birth_name
                && !father.surname.is_empty()
                && father.surname == mother.surname,
        )
    }
}

pub struct LargeAgeGap {
    pub max_years: u32,
    pub estimate: bool,
}

impl Rule for LargeAgeGap {
    fn id(&self) -> u32 {
        17
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_years), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Large age difference between spouses"
    }
}

impl FamilyRule for LargeAgeGap {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let father = s.father.birth_date(self.estimate);
        let mother = s.mother.birth_date(self.estimate);
        Verdict::broken_if(
            known(father)
                && known(mother)
                && exceeds_years((father - mother).abs(), self.max_years),
        )
    }
}

pub struct MarriageBeforeBirth {
    pub estimate: bool,
}

impl Rule for MarriageBeforeBirth {
    fn id(&self) -> u32 {
        18
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Marriage before birth"
    }
}

impl FamilyRule for MarriageBeforeBirth {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let marriage = s.family.marriage_date();
        if !known(marriage) {
            return Verdict::Passed;
        }
        let born_after = |p: &PersonSnapshot| {
            let birth = p.birth_date(self.estimate);
            known(birth) && birth > marriage
        };
        Verdict::broken_if(born_after(&*s.father) || born_after(&*s.mother))
    }
}

pub struct MarriageAfterDeath {
    pub estimate: bool,
}

impl Rule for MarriageAfterDeath {
    fn id(&self) -> u32 {
        19
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Marriage after death"
    }
}

impl FamilyRule for MarriageAfterDeath {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let marriage = s.family.marriage_date();
        if !known(marriage) {
            return Verdict::Passed;
        }
        let died_before = |p: &PersonSnapshot| {
            let death = p.death_date(self.estimate);
            known(death) && death < marriage
        };
        Verdict::broken_if(died_before(&*s.father) || died_before(&*s.mother))
    }
}

pub struct EarlyMarriage {
    pub min_age: u32,
    pub estimate: bool,
}

impl Rule for EarlyMarriage {
    fn id(&self) -> u32 {
        20
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.min_age), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Early marriage"
    }
}

impl FamilyRule for EarlyMarriage {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let marriage = s.family.marriage_date();
        if !known(marriage) {
            return Verdict::Passed;
        }
        // a birth after the marriage is rule 18's business
        let too_young = |p: &PersonSnapshot| {
            let birth = p.birth_date(self.estimate);
            known(birth) && birth < marriage && short_of_years(marriage - birth, self.min_age)
        };
        Verdict::broken_if(too_young(&*s.father) || too_young(&*s.mother))
    }
}

pub struct LateMarriage {
    pub max_age: u32,
    pub estimate: bool,
}

impl Rule for LateMarriage {
    fn id(&self) -> u32 {
        21
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_age), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Late marriage"
    }
}

impl FamilyRule for LateMarriage {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let marriage = s.family.marriage_date();
        if !known(marriage) {
            return Verdict::Passed;
        }
        let too_old = |p: &PersonSnapshot| {
            let birth = p.birth_date(self.estimate);
            known(birth) && exceeds_years(marriage - birth, self.max_age)
        };
        Verdict::broken_if(too_old(&*s.father) || too_old(&*s.mother))
    }
}

pub struct OldParent {
    pub max_mother: u32,
    pub max_father: u32,
    pub estimate: bool,
}

impl Rule for OldParent {
    fn id(&self) -> u32 {
        22
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_mother), threshold(self.max_father), flag(self.estimate)]
    }
    fn message(&self, culprit: Culprit) -> &'static str {
        parent_message(culprit, "Old father", "Old mother")
    }
}

impl FamilyRule for OldParent {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let father = s.father.birth_date(self.estimate);
        let mother = s.mother.birth_date(self.estimate);

        for child in s.birth_dates(self.estimate) {
            let verdict = blame(
                known(father) && exceeds_years(child - father, self.max_father),
                known(mother) && exceeds_years(child - mother, self.max_mother),
            );
            if verdict.is_broken() {
                return verdict;
            }
        }
        Verdict::Passed
    }
}

pub struct YoungParent {
    pub min_mother: u32,
    pub min_father: u32,
    pub estimate: bool,
}

impl Rule for YoungParent {
    fn id(&self) -> u32 {
        23
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.min_mother), threshold(self.min_father), flag(self.estimate)]
    }
    fn message(&self, culprit: Culprit) -> &'static str {
        parent_message(culprit, "Young father", "Young mother")
    }
}

impl FamilyRule for YoungParent {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let father = s.father.birth_date(self.estimate);
        let mother = s.mother.birth_date(self.estimate);

        for child in s.birth_dates(self.estimate) {
            let verdict = blame(
                known(father) && short_of_years(child - father, self.min_father),
                known(mother) && short_of_years(child - mother, self.min_mother),
            );
            if verdict.is_broken() {
                return verdict;
            }
        }
        Verdict::Passed
    }
}

pub struct UnbornParent {
    pub estimate: bool,
}

impl Rule for UnbornParent {
    fn id(&self) -> u32 {
        24
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, culprit: Culprit) -> &'static str {
        parent_message(culprit, "Unborn father", "Unborn mother")
    }
}

impl FamilyRule for UnbornParent {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let father = s.father.birth_date(self.estimate);
        let mother = s.mother.birth_date(self.estimate);

        for child in s.birth_dates(self.estimate) {
            let verdict = blame(
                known(father) && father > child,
                known(mother) && mother > child,
            );
            if verdict.is_broken() {
                return verdict;
            }
        }
        Verdict::Passed
    }
}

/// A child born after a birth parent's death. Fathers get a gestation
/// allowance, mothers none.
pub struct DeadParent {
    pub estimate: bool,
}

impl Rule for DeadParent {
    fn id(&self) -> u32 {
        25
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn params(&self) -> Vec<i64> {
        vec![flag(self.estimate)]
    }
    fn message(&self, culprit: Culprit) -> &'static str {
        parent_message(culprit, "Dead father", "Dead mother")
    }
}

impl FamilyRule for DeadParent {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let father = s.father.death_date(self.estimate);
        let mother = s.mother.death_date(self.estimate);

        for (child_ref, child) in &s.children {
            let born = child.birth_date(self.estimate);
            if !known(born) {
                continue;
            }
            let verdict = blame(
                child_ref.father_relation == ChildRelation::Birth
                    && known(father)
                    && father + POSTHUMOUS_DAYS < born,
                child_ref.mother_relation == ChildRelation::Birth && known(mother) && mother < born,
            );
            if verdict.is_broken() {
                return verdict;
            }
        }
        Verdict::Passed
    }
}

pub struct LargeChildrenSpan {
    pub max_years: u32,
    pub estimate: bool,
}

impl Rule for LargeChildrenSpan {
    fn id(&self) -> u32 {
        26
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_years), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Large year span for all children"
    }
}

impl FamilyRule for LargeChildrenSpan {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let dates = s.birth_dates(self.estimate);
        match (dates.iter().min(), dates.iter().max()) {
            (Some(first), Some(last)) => {
                Verdict::broken_if(exceeds_years(last - first, self.max_years))
            }
            _ => Verdict::Passed,
        }
    }
}

pub struct LargeChildrenAgeDiff {
    pub max_years: u32,
    pub estimate: bool,
}

impl Rule for LargeChildrenAgeDiff {
    fn id(&self) -> u32 {
        27
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn params(&self) -> Vec<i64> {
        vec![threshold(self.max_years), flag(self.estimate)]
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Large age differences between children"
    }
}

impl FamilyRule for LargeChildrenAgeDiff {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let mut dates = s.birth_dates(self.estimate);
        dates.sort_unstable();
        let widest = dates.windows(2).map(|w| w[1] - w[0]).max();
        Verdict::broken_if(widest.is_some_and(|gap| exceeds_years(gap, self.max_years)))
    }
}

pub struct MarriedRelation;

impl Rule for MarriedRelation {
    fn id(&self) -> u32 {
        31
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Marriage date but not married"
    }
}

impl FamilyRule for MarriedRelation {
    fn check(&self, s: &FamilySubject) -> Verdict {
        Verdict::broken_if(
            known(s.family.marriage_date()) && s.family.relationship != FamilyRelation::Married,
        )
    }
}

/// Birth children should be listed oldest first. Undated children are skipped.
pub struct ChildrenOrder;

impl Rule for ChildrenOrder {
    fn id(&self) -> u32 {
        41
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Children are not in chronological order"
    }
}

impl FamilyRule for ChildrenOrder {
    fn check(&self, s: &FamilySubject) -> Verdict {
        let dates: Vec<i32> = s
            .children
            .iter()
            .filter(|(child_ref, _)| {
                child_ref.father_relation == ChildRelation::Birth
                    || child_ref.mother_relation == ChildRelation::Birth
            })
            .map(|(_, child)| child.birth.estimate)
            .filter(|d| known(*d))
            .collect();

        Verdict::broken_if(dates.windows(2).any(|w| w[0] > w[1]))
    }
}

pub struct FamilyUnknownRoleEvents;

impl Rule for FamilyUnknownRoleEvents {
    fn id(&self) -> u32 {
        42
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Family has events with unknown role"
    }
}

impl FamilyRule for FamilyUnknownRoleEvents {
    fn check(&self, s: &FamilySubject) -> Verdict {
        Verdict::broken_if(s.family.has_unknown_role_event)
    }
}

pub struct FamilyEventsOutOfOrder;

impl Rule for FamilyEventsOutOfOrder {
    fn id(&self) -> u32 {
        43
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn message(&self, _: Culprit) -> &'static str {
        "Family events are not in chronological order"
    }
}

impl FamilyRule for FamilyEventsOutOfOrder {
    fn check(&self, s: &FamilySubject) -> Verdict {
        Verdict::broken_if(s.family.events_out_of_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::day_number;
    use crate::model::ChildRef;
    use crate::snapshot::{DatePair, FamilySnapshot};
    use std::rc::Rc;

    fn exact(value: i32) -> DatePair {
        DatePair { exact: value, estimate: value }
    }

    fn person(handle: &str, gender: Gender, birth: i32) -> PersonSnapshot {
        PersonSnapshot {
            handle: handle.into(),
            id: handle.to_uppercase(),
            gender,
            birth: exact(birth),
            birth_valid: true,
            death_valid: true,
            has_birth_name: true,
            ..PersonSnapshot::default()
        }
    }

    fn birth_ref(child: &str) -> ChildRef {
        ChildRef {
            child: child.into(),
            father_relation: ChildRelation::Birth,
            mother_relation: ChildRelation::Birth,
        }
    }

    fn subject(father: PersonSnapshot, mother: PersonSnapshot, marriage: i32) -> FamilySubject {
        FamilySubject {
            family: Rc::new(FamilySnapshot {
                handle: "f1".into(),
                id: "F0001".into(),
                marriage: exact(marriage),
                relationship: FamilyRelation::Married,
                ..FamilySnapshot::default()
            }),
            father: Rc::new(father),
            mother: Rc::new(mother),
            children: Vec::new(),
        }
    }

    fn with_children(mut s: FamilySubject, births: &[i32]) -> FamilySubject {
        s.children = births
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let handle = format!("c{i}");
                (birth_ref(&handle), Rc::new(person(&handle, Gender::Female, *b)))
            })
            .collect();
        s
    }

    fn couple() -> FamilySubject {
        subject(
            person("dad", Gender::Male, day_number(1900, 1, 1)),
            person("mom", Gender::Female, day_number(1902, 1, 1)),
            day_number(1925, 6, 1),
        )
    }

    #[test]
    fn gender_rules() {
        let s = couple();
        assert!(!SameSexFamily.check(&s).is_broken());
        assert!(!FemaleHusband.check(&s).is_broken());
        assert!(!MaleWife.check(&s).is_broken());

        let two_men = subject(
            person("a", Gender::Male, 0),
            person("b", Gender::Male, 0),
            0,
        );
        assert!(SameSexFamily.check(&two_men).is_broken());
        assert!(MaleWife.check(&two_men).is_broken());

        let unknowns = subject(person("a", Gender::Unknown, 0), person("b", Gender::Unknown, 0), 0);
        assert!(!SameSexFamily.check(&unknowns).is_broken());

        let swapped = subject(person("a", Gender::Female, 0), person("b", Gender::Male, 0), 0);
        assert!(FemaleHusband.check(&swapped).is_broken());
        assert!(MaleWife.check(&swapped).is_broken());
        assert!(!SameSexFamily.check(&swapped).is_broken());
    }

    #[test]
    fn single_parent_family_never_same_sex() {
        let s = subject(person("a", Gender::Male, 0), PersonSnapshot::empty(), 0);
        assert!(!SameSexFamily.check(&s).is_broken());
        assert!(!MaleWife.check(&s).is_broken());
    }

    #[test]
    fn same_surname_needs_birth_names() {
        let mut father = person("a", Gender::Male, 0);
        let mut mother = person("b", Gender::Female, 0);
        father.surname = "Holm".into();
        mother.surname = "Holm".into();
        assert!(SameSurnameFamily.check(&subject(father.clone(), mother.clone(), 0)).is_broken());

        mother.has_birth_name = false;
        assert!(!SameSurnameFamily.check(&subject(father.clone(), mother.clone(), 0)).is_broken());

        mother.has_birth_name = true;
        father.surname.clear();
        mother.surname.clear();
        assert!(!SameSurnameFamily.check(&subject(father, mother, 0)).is_broken());
    }

    #[test]
    fn age_gap_depends_on_threshold() {
        let s = subject(person("a", Gender::Male, 50_000), person("b", Gender::Female, 10_000), 0);
        assert!(LargeAgeGap { max_years: 30, estimate: false }.check(&s).is_broken());
        assert!(!LargeAgeGap { max_years: 200, estimate: false }.check(&s).is_broken());

        let reversed = subject(
            person("a", Gender::Male, 10_000),
            person("b", Gender::Female, 50_000),
            0,
        );
        assert!(LargeAgeGap { max_years: 30, estimate: false }.check(&reversed).is_broken());
    }

    #[test]
    fn age_gap_ignores_unknown_births() {
        let s = subject(person("a", Gender::Male, 50_000), person("b", Gender::Female, 0), 0);
        assert!(!LargeAgeGap { max_years: 30, estimate: false }.check(&s).is_broken());
    }

    #[test]
    fn marriage_against_birth_and_death() {
        let mut s = couple();
        assert!(!MarriageBeforeBirth { estimate: false }.check(&s).is_broken());

        s.mother = Rc::new(person("mom", Gender::Female, day_number(1926, 1, 1)));
        assert!(MarriageBeforeBirth { estimate: false }.check(&s).is_broken());

        let mut s = couple();
        let mut father = person("dad", Gender::Male, day_number(1900, 1, 1));
        father.death = exact(day_number(1920, 1, 1));
        s.father = Rc::new(father);
        assert!(MarriageAfterDeath { estimate: false }.check(&s).is_broken());
        assert!(!MarriageAfterDeath { estimate: false }.check(&couple()).is_broken());
    }

    #[test]
    fn no_marriage_date_no_marriage_checks() {
        let mut s = couple();
        s.family = Rc::new(FamilySnapshot::default());
        assert!(!MarriageBeforeBirth { estimate: false }.check(&s).is_broken());
        assert!(!EarlyMarriage { min_age: 30, estimate: false }.check(&s).is_broken());
        assert!(!LateMarriage { max_age: 1, estimate: false }.check(&s).is_broken());
        assert!(!MarriedRelation.check(&s).is_broken());
    }

    #[test]
    fn early_and_late_marriage() {
        // married at 25 and 23
        let s = couple();
        assert!(!EarlyMarriage { min_age: 17, estimate: false }.check(&s).is_broken());
        assert!(EarlyMarriage { min_age: 24, estimate: false }.check(&s).is_broken());
        assert!(!LateMarriage { max_age: 50, estimate: false }.check(&s).is_broken());
        assert!(LateMarriage { max_age: 24, estimate: false }.check(&s).is_broken());
    }

    #[test]
    fn old_parent_blames_father_first() {
        let rule = OldParent { max_mother: 48, max_father: 65, estimate: false };
        let s = with_children(couple(), &[day_number(1930, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Passed);

        let s = with_children(couple(), &[day_number(1955, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Mother));
        assert_eq!(rule.message(Culprit::Mother), "Old mother");

        let s = with_children(couple(), &[day_number(1970, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Father));
        assert_eq!(rule.message(Culprit::Father), "Old father");
    }

    #[test]
    fn young_parent() {
        let rule = YoungParent { min_mother: 17, min_father: 18, estimate: false };
        let s = with_children(couple(), &[day_number(1917, 6, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Father));
        let s = with_children(couple(), &[day_number(1918, 6, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Mother));
        let s = with_children(couple(), &[day_number(1930, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Passed);
    }

    #[test]
    fn unborn_parent() {
        let rule = UnbornParent { estimate: false };
        let s = with_children(couple(), &[day_number(1901, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Mother));
        let s = with_children(couple(), &[day_number(1899, 1, 1)]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Father));
        assert_eq!(rule.message(Culprit::Father), "Unborn father");
    }

    #[test]
    fn dead_parent_allows_posthumous_children_of_fathers() {
        let rule = DeadParent { estimate: false };
        let death = day_number(1930, 1, 1);

        let mut father = person("dad", Gender::Male, day_number(1900, 1, 1));
        father.death = exact(death);
        let mut s = couple();
        s.father = Rc::new(father);

        let within = with_children(s.clone(), &[death + 200]);
        assert_eq!(rule.check(&within), Verdict::Passed);

        let beyond = with_children(s.clone(), &[death + 300]);
        assert_eq!(rule.check(&beyond), Verdict::Broken(Culprit::Father));

        let mut adopted = beyond;
        adopted.children[0].0.father_relation = ChildRelation::Adopted;
        assert_eq!(rule.check(&adopted), Verdict::Passed);

        let mut mother = person("mom", Gender::Female, day_number(1902, 1, 1));
        mother.death = exact(death);
        let mut s = couple();
        s.mother = Rc::new(mother);
        let s = with_children(s, &[death + 1]);
        assert_eq!(rule.check(&s), Verdict::Broken(Culprit::Mother));
        assert_eq!(rule.message(Culprit::Mother), "Dead mother");
    }

    #[test]
    fn children_span_and_gaps() {
        let births = [day_number(1926, 1, 1), day_number(1940, 1, 1), day_number(1928, 1, 1)];
        let s = with_children(couple(), &births);

        assert!(!LargeChildrenSpan { max_years: 25, estimate: false }.check(&s).is_broken());
        assert!(LargeChildrenSpan { max_years: 10, estimate: false }.check(&s).is_broken());

        // sorted gaps are 2 and 12 years
        assert!(LargeChildrenAgeDiff { max_years: 8, estimate: false }.check(&s).is_broken());
        assert!(!LargeChildrenAgeDiff { max_years: 13, estimate: false }.check(&s).is_broken());
    }

    #[test]
    fn childless_family_passes_child_rules() {
        let s = couple();
        assert!(!LargeChildrenSpan { max_years: 0, estimate: false }.check(&s).is_broken());
        assert!(!LargeChildrenAgeDiff { max_years: 0, estimate: false }.check(&s).is_broken());
        assert!(!ChildrenOrder.check(&s).is_broken());
    }

    #[test]
    fn married_relation() {
        let mut s = couple();
        assert!(!MarriedRelation.check(&s).is_broken());
        s.family = Rc::new(FamilySnapshot {
            marriage: exact(day_number(1925, 6, 1)),
            relationship: FamilyRelation::Unmarried,
            ..FamilySnapshot::default()
        });
        assert!(MarriedRelation.check(&s).is_broken());
    }

    #[test]
    fn children_out_of_order() {
        let d1 = day_number(1926, 1, 1);
        let d2 = day_number(1928, 1, 1);
        let d3 = day_number(1930, 1, 1);

        let s = with_children(couple(), &[d1, d3, d2]);
        assert!(ChildrenOrder.check(&s).is_broken());

        let s = with_children(couple(), &[d1, d2, d3]);
        assert!(!ChildrenOrder.check(&s).is_broken());

        let s = with_children(couple(), &[d1, 0, d2]);
        assert!(!ChildrenOrder.check(&s).is_broken());

        let mut s = with_children(couple(), &[d1, d3, d2]);
        s.children[1].0.father_relation = ChildRelation::Stepchild;
        s.children[1].0.mother_relation = ChildRelation::Stepchild;
        assert!(!ChildrenOrder.check(&s).is_broken());
    }

    #[test]
    fn family_event_flags() {
        let mut s = couple();
        assert!(!FamilyUnknownRoleEvents.check(&s).is_broken());
        assert!(!FamilyEventsOutOfOrder.check(&s).is_broken());
        s.family = Rc::new(FamilySnapshot {
            has_unknown_role_event: true,
            events_out_of_order: true,
            ..FamilySnapshot::default()
        });
        assert!(FamilyUnknownRoleEvents.check(&s).is_broken());
        assert!(FamilyEventsOutOfOrder.check(&s).is_broken());
    }
}
