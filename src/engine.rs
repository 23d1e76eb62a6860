//! The facet engine: retained history, unfiltered and filtered tables, pins
//! and string counts.
//!
//! All state is owned here and mutated from the UI thread only. The
//! filtered table is rebuilt from the full history whenever the pin set
//! changes and is otherwise extended line by line while pins are active.

use crate::facets::FacetTable;
use crate::pins::{PinChange, PinSet};
use crate::record::{parse_line, Record};
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct FacetEngine {
    history: Vec<String>,
    full: FacetTable,
    filtered: FacetTable,
    pins: PinSet,
    string_counts: HashMap<String, usize>,
    total_records: usize,
}

impl FacetEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Empty lines are ignored.
    ///
    /// Returns the parsed record when the line was accepted.
    pub fn ingest(&mut self, line: &str) -> Option<Record> {
        let record = parse_line(line)?;
        self.history.push(line.to_string());
        self.total_records += 1;

        match &record {
            Record::Category(value) => {
                *self.string_counts.entry(value.clone()).or_insert(0) += 1;
            }
            Record::Observation { .. } => {
                self.full.apply(&record);
                if !self.pins.is_empty() && self.pins.matches(&record) {
                    self.filtered.apply(&record);
                }
            }
        }
        Some(record)
    }

    /// Toggle the pin on `value`.
    ///
    /// A new pin binds to `focus_column` when a single column is in view,
    /// otherwise to the lowest column of the unfiltered table that contains
    /// the value. Returns `None` (and changes nothing) when no column can be
    /// resolved.
    pub fn toggle_pin(&mut self, value: &str, focus_column: Option<usize>) -> Option<PinChange> {
        let column = match self.pins.column_of(value) {
            Some(column) => column,
            None => match focus_column.or_else(|| self.full.first_column_containing(value)) {
                Some(column) => column,
                None => {
                    log::warn!("cannot pin {value:?}: not present in any facet column");
                    return None;
                }
            },
        };

        let change = self.pins.toggle(value, column);
        log::info!("{change:?} {value:?} ({} pins active)", self.pins.len());

        if self.pins.is_empty() {
            self.clear_pins();
        } else {
            self.rebuild_filtered();
        }
        Some(change)
    }

    /// Drop every pin and fall back to the unfiltered table.
    pub fn clear_pins(&mut self) {
        self.pins.clear();
        self.filtered.clear();
    }

    /// Replay the whole history into a fresh filtered table.
    pub fn rebuild_filtered(&mut self) {
        let started = Instant::now();
        let mut filtered = FacetTable::new();
        for line in &self.history {
            if let Some(record) = parse_line(line) {
                if record.is_observation() && self.pins.matches(&record) {
                    filtered.apply(&record);
                }
            }
        }
        self.filtered = filtered;
        log::debug!(
            "rebuilt filtered table from {} lines in {:?} ({} keys)",
            self.history.len(),
            started.elapsed(),
            self.filtered.key_count()
        );
    }

    pub fn is_filtered(&self) -> bool {
        !self.pins.is_empty()
    }

    /// The table views should display: filtered while any pin is active.
    pub fn active_table(&self) -> &FacetTable {
        if self.is_filtered() {
            &self.filtered
        } else {
            &self.full
        }
    }

    pub fn full(&self) -> &FacetTable {
        &self.full
    }

    pub fn filtered(&self) -> &FacetTable {
        &self.filtered
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn string_counts(&self) -> &HashMap<String, usize> {
        &self.string_counts
    }

    /// Once any non-numeric first field is seen the display switches to
    /// string frequencies for good.
    pub fn has_string_values(&self) -> bool {
        !self.string_counts.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [&str; 4] = [
        "10.5\tred\tseattle",
        "15.2\tred\tsan jose",
        "8.7\tblue\tseattle",
        "12.1\tblue\tsan jose",
    ];

    fn engine_with(lines: &[&str]) -> FacetEngine {
        let mut engine = FacetEngine::new();
        for line in lines {
            engine.ingest(line);
        }
        engine
    }

    #[test]
    fn test_ingest_counts_each_accepted_line_once() {
        let engine = engine_with(&["1\ta", "", "word\ta", "   ", "2\tb"]);
        assert_eq!(engine.total_records(), 3);
        assert_eq!(engine.history().len(), 3);
        assert_eq!(engine.string_counts().get("word"), Some(&1));
        assert!(engine.has_string_values());
    }

    #[test]
    fn test_category_lines_do_not_touch_tables() {
        let engine = engine_with(&["word\ta", "word\tb"]);
        assert!(engine.full().is_empty());
        assert_eq!(engine.string_counts().get("word"), Some(&2));
    }

    #[test]
    fn test_filtered_is_empty_without_pins() {
        let engine = engine_with(&SAMPLE);
        assert!(!engine.is_filtered());
        assert!(engine.filtered().is_empty());
        assert_eq!(engine.active_table(), engine.full());
    }

    #[test]
    fn test_pin_in_focused_column_filters_history() {
        let mut engine = engine_with(&SAMPLE);
        assert_eq!(
            engine.toggle_pin("red", Some(1)),
            Some(PinChange::Pinned { column: 1 })
        );
        assert!(engine.is_filtered());
        let filtered = engine.filtered();
        assert_eq!(filtered.samples(2, "seattle"), Some(&[10.5][..]));
        assert_eq!(filtered.samples(2, "san jose"), Some(&[15.2][..]));
        assert_eq!(filtered.samples(1, "blue"), None);
        assert_eq!(engine.active_table(), engine.filtered());
    }

    #[test]
    fn test_pin_without_focus_binds_lowest_column() {
        let mut engine = engine_with(&["1\tx\tshared", "2\tshared\ty"]);
        assert_eq!(
            engine.toggle_pin("shared", None),
            Some(PinChange::Pinned { column: 1 })
        );
        assert_eq!(engine.filtered().samples(2, "y"), Some(&[2.0][..]));
        assert_eq!(engine.filtered().samples(2, "shared"), None);
    }

    #[test]
    fn test_unknown_value_is_not_pinned() {
        let mut engine = engine_with(&SAMPLE);
        assert_eq!(engine.toggle_pin("purple", None), None);
        assert!(!engine.is_filtered());
    }

    #[test]
    fn test_unpin_restores_full_table() {
        let mut engine = engine_with(&SAMPLE);
        engine.toggle_pin("red", Some(1));
        assert_eq!(
            engine.toggle_pin("red", None),
            Some(PinChange::Unpinned { column: 1 })
        );
        assert!(!engine.is_filtered());
        assert!(engine.filtered().is_empty());
        assert_eq!(engine.active_table(), engine.full());
    }

    #[test]
    fn test_new_lines_extend_filtered_incrementally() {
        let mut engine = engine_with(&SAMPLE);
        engine.toggle_pin("blue", Some(1));
        engine.ingest("20\tblue\tportland");
        engine.ingest("30\tred\tportland");
        assert_eq!(engine.filtered().samples(2, "portland"), Some(&[20.0][..]));

        let incremental = engine.filtered().clone();
        engine.rebuild_filtered();
        assert_eq!(engine.filtered(), &incremental);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut engine = engine_with(&SAMPLE);
        engine.toggle_pin("seattle", Some(2));
        engine.rebuild_filtered();
        let first = engine.filtered().clone();
        engine.rebuild_filtered();
        assert_eq!(engine.filtered(), &first);
    }

    #[test]
    fn test_clear_pins() {
        let mut engine = engine_with(&SAMPLE);
        engine.toggle_pin("red", Some(1));
        engine.toggle_pin("seattle", Some(2));
        engine.clear_pins();
        assert!(!engine.is_filtered());
        assert!(engine.filtered().is_empty());
    }
}
