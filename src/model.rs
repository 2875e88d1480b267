//! Minimal genealogical records: the fields the verification rules consume.
//!
//! These mirror what a genealogy database hands out per object. Everything
//! else on a real person or family (sources, media, notes, attributes) is
//! ignored by the tool and therefore not modelled.

use serde::{Deserialize, Serialize};

use crate::date;

/// Opaque stable identifier for a database record.
pub type Handle = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A calendar date as entered by the user. Zero month or day means the part
/// is unknown; `text_only` dates could not be parsed and carry no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Date {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub text_only: bool,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Date { year, month, day, text_only: false }
    }

    pub fn text() -> Self {
        Date { text_only: true, ..Date::default() }
    }

    pub fn sort_value(&self) -> i32 {
        if self.text_only || (self.year == 0 && self.month == 0 && self.day == 0) {
            return 0;
        }
        date::day_number(self.year, self.month, self.day)
    }

    /// Day and month are both known.
    pub fn is_exact(&self) -> bool {
        self.day != 0 && self.month != 0
    }

    pub fn is_valid(&self) -> bool {
        !self.text_only
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Birth,
    Death,
    Baptism,
    Christening,
    Burial,
    Marriage,
    Divorce,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    #[default]
    Primary,
    Family,
    Unknown,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub handle: Handle,
    #[serde(default)]
    pub id: String,
    pub event_type: EventType,
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub event: Handle,
    #[serde(default)]
    pub role: EventRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameType {
    #[default]
    Birth,
    Married,
    AlsoKnownAs,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Name {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub name_type: NameType,
}

impl Name {
    /// "Surname, Given" as shown in result lists.
    pub fn display(&self) -> String {
        match (self.surname.is_empty(), self.first_name.is_empty()) {
            (false, false) => format!("{}, {}", self.surname, self.first_name),
            (false, true) => self.surname.clone(),
            (true, false) => self.first_name.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub handle: Handle,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub primary_name: Name,
    #[serde(default)]
    pub event_refs: Vec<EventRef>,
    /// Families in which this person is a child.
    #[serde(default)]
    pub parent_families: Vec<Handle>,
    /// Families in which this person is a spouse.
    #[serde(default)]
    pub families: Vec<Handle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildRelation {
    #[default]
    Birth,
    Adopted,
    Stepchild,
    Foster,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRef {
    pub child: Handle,
    #[serde(default)]
    pub father_relation: ChildRelation,
    #[serde(default)]
    pub mother_relation: ChildRelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyRelation {
    Married,
    Unmarried,
    CivilUnion,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub handle: Handle,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub father: Option<Handle>,
    #[serde(default)]
    pub mother: Option<Handle>,
    #[serde(default)]
    pub child_refs: Vec<ChildRef>,
    #[serde(default)]
    pub event_refs: Vec<EventRef>,
    #[serde(default)]
    pub relationship: FamilyRelation,
}
