//! Results of one run, with the user's acknowledge marks.
//!
//! Rows are grouped by message. A group's mark is derived from its rows, so
//! toggling a row re-derives the group and toggling a group sets every row.

use crate::error::Result;
use crate::rules::Violation;
use crate::store::ignores::{IgnoreSet, IgnoreStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub violation: Violation,
    pub ignored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMark {
    None,
    Partial,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub message: String,
    /// Row indices, in insertion order.
    pub rows: Vec<usize>,
    pub ignored: usize,
}

impl Group {
    pub fn unacknowledged(&self) -> usize {
        self.rows.len() - self.ignored
    }

    pub fn mark(&self) -> GroupMark {
        if self.ignored == 0 {
            GroupMark::None
        } else if self.ignored == self.rows.len() {
            GroupMark::All
        } else {
            GroupMark::Partial
        }
    }
}

#[derive(Debug, Default)]
pub struct VerifyResults {
    rows: Vec<Row>,
    ignores: IgnoreSet,
    hide_marked: bool,
    selected: Option<usize>,
}

impl VerifyResults {
    /// Empty results; rows added later start out ignored when `ignores`
    /// lists them.
    pub fn new(ignores: IgnoreSet) -> Self {
        VerifyResults {
            ignores,
            ..Self::default()
        }
    }

    pub fn add(&mut self, violation: Violation) {
        let ignored = self.ignores.contains(&violation.handle, &violation.rule);
        self.rows.push(Row { violation, ignored });
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        for violation in violations {
            self.add(violation);
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows currently ignored.
    pub fn marked(&self) -> usize {
        self.rows.iter().filter(|row| row.ignored).count()
    }

    /// Groups keyed by message, in first-seen order.
    pub fn groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            let pos = match groups.iter().position(|g| g.message == row.violation.message) {
                Some(pos) => pos,
                None => {
                    groups.push(Group {
                        message: row.violation.message.clone(),
                        rows: Vec::new(),
                        ignored: 0,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[pos];
            group.rows.push(index);
            if row.ignored {
                group.ignored += 1;
            }
        }
        groups
    }

    /// Flips one row. Returns false for an index out of range.
    pub fn toggle_row(&mut self, index: usize) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.ignored = !row.ignored;
                true
            }
            None => false,
        }
    }

    /// Un-ignores every row of a fully ignored group, otherwise ignores them
    /// all. Returns the number of rows in the group.
    pub fn toggle_group(&mut self, message: &str) -> usize {
        let Some(group) = self.groups().into_iter().find(|g| g.message == message) else {
            return 0;
        };
        let ignore = group.mark() != GroupMark::All;
        for &index in &group.rows {
            self.rows[index].ignored = ignore;
        }
        group.rows.len()
    }

    /// Sets one row. Returns false for an index out of range.
    pub fn set_row(&mut self, index: usize, ignored: bool) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.ignored = ignored;
                true
            }
            None => false,
        }
    }

    /// Sets every row with `message`. Returns how many there were.
    pub fn set_group(&mut self, message: &str, ignored: bool) -> usize {
        let mut count = 0;
        for row in self.rows.iter_mut().filter(|row| row.violation.message == message) {
            row.ignored = ignored;
            count += 1;
        }
        count
    }

    pub fn mark_all(&mut self) {
        self.rows.iter_mut().for_each(|row| row.ignored = true);
    }

    pub fn unmark_all(&mut self) {
        self.rows.iter_mut().for_each(|row| row.ignored = false);
    }

    pub fn invert(&mut self) {
        self.rows.iter_mut().for_each(|row| row.ignored = !row.ignored);
    }

    pub fn set_hide_marked(&mut self, hide: bool) {
        self.hide_marked = hide;
    }

    pub fn hide_marked(&self) -> bool {
        self.hide_marked
    }

    /// Indices of the rows shown under the current filter.
    pub fn visible(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !(self.hide_marked && row.ignored))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn select(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selected = Some(index);
        }
    }

    /// The selected row, kept across filter changes.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Every currently ignored (handle, rule) pair.
    pub fn marking(&self) -> IgnoreSet {
        let mut set = IgnoreSet::new();
        for row in self.rows.iter().filter(|row| row.ignored) {
            set.insert(row.violation.handle.clone(), row.violation.rule.clone());
        }
        set
    }

    /// Persists the current marking, replacing the previous ignore file.
    pub fn close(self, store: &IgnoreStore) -> Result<()> {
        store.save(&self.marking())
    }
}
