//! Pinned facet values and the record filter they define.

use crate::record::Record;
use std::collections::BTreeMap;

/// Result of toggling a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinChange {
    Pinned { column: usize },
    Unpinned { column: usize },
}

/// Pinned facet values, each bound to the column it was captured under.
///
/// A value is pinned at most once; its column binding never changes while
/// it stays pinned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    pins: BTreeMap<String, usize>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinned(&self, value: &str) -> bool {
        self.pins.contains_key(value)
    }

    pub fn column_of(&self, value: &str) -> Option<usize> {
        self.pins.get(value).copied()
    }

    /// Remove `value` if pinned, otherwise pin it under `column`.
    pub fn toggle(&mut self, value: &str, column: usize) -> PinChange {
        match self.pins.remove(value) {
            Some(column) => PinChange::Unpinned { column },
            None => {
                self.pins.insert(value.to_string(), column);
                PinChange::Pinned { column }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// (value, column) pairs ordered by value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.pins.iter().map(|(value, col)| (value.as_str(), *col))
    }

    /// Whether `record` satisfies every pin.
    ///
    /// A pin whose column the record does not reach does not veto it.
    pub fn matches(&self, record: &Record) -> bool {
        self.pins.iter().all(|(value, column)| match record.facet(*column) {
            Some(field) => field == value.as_str(),
            None => true,
        })
    }

    pub fn clear(&mut self) {
        self.pins.clear();
    }
}
