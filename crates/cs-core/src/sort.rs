//! # Generic List Sorter
//!
//! Sorts flat records by a named field. Text compares case-insensitively,
//! numbers and flags by their natural order. A record lacking the key, or a
//! pair of values of different kinds, compares equal.
//!
//! `ListSorter` alternates direction on every call: the first sort is
//! ascending, the next descending, and so on, regardless of which key was
//! used.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Participant, Relation};

/// A single field value extracted for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Flag(bool),
}

/// A record whose fields can be looked up by name.
pub trait SortableRecord {
    /// The value stored under `key`, or `None` if the record has no such field.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Compare two records by `key`.
pub fn compare_by_field<R: SortableRecord>(a: &R, b: &R, key: &str) -> Ordering {
    match (a.field(key), b.field(key)) {
        (Some(x), Some(y)) => compare_values(&x, &y),
        _ => Ordering::Equal,
    }
}

fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x.to_uppercase().cmp(&y.to_uppercase()),
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Flag(x), FieldValue::Flag(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Stable in-place sort of `records` by `key` in the given direction.
pub fn sort_by_field<R: SortableRecord>(records: &mut [R], key: &str, order: SortOrder) {
    // Missing keys make the comparator non-transitive, which `slice::sort_by`
    // is allowed to panic on. Insertion sort stays well-defined and stable.
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 {
            let ord = compare_by_field(&records[j - 1], &records[j], key);
            let ord = match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            };
            if ord != Ordering::Greater {
                break;
            }
            records.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Sorter that flips direction after every invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSorter {
    next: SortOrder,
}

impl ListSorter {
    /// A sorter whose first call sorts ascending.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sorter whose first call sorts in `order`.
    pub fn starting_with(order: SortOrder) -> Self {
        Self { next: order }
    }

    /// Direction the next call will use.
    pub fn next_order(&self) -> SortOrder {
        self.next
    }

    /// Sort `records` by `key` and flip the direction. Returns the direction applied.
    pub fn sort<R: SortableRecord>(&mut self, records: &mut [R], key: &str) -> SortOrder {
        let applied = self.next;
        sort_by_field(records, key, applied);
        self.next = applied.toggled();
        applied
    }
}

// ─── Record implementations ──────────────────────────────────────────

impl SortableRecord for Participant {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "firstname" => Some(FieldValue::Text(&self.firstname)),
            "lastname" => Some(FieldValue::Text(&self.lastname)),
            "email" => self.email.as_deref().map(FieldValue::Text),
            "grade" => self.grade.map(|g| FieldValue::Number(f64::from(g))),
            "schooltype" => self.schooltype.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl SortableRecord for Relation {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "firstname" => Some(FieldValue::Text(&self.first_name)),
            "lastname" => Some(FieldValue::Text(&self.last_name)),
            "date" => Some(FieldValue::Number(self.started_at.epoch_secs() as f64)),
            "dissolved" => Some(FieldValue::Flag(self.dissolved)),
            _ => None,
        }
    }
}

impl SortableRecord for Map<String, Value> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match self.get(key)? {
            Value::String(s) => Some(FieldValue::Text(s)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::Bool(b) => Some(FieldValue::Flag(*b)),
            _ => None,
        }
    }
}
