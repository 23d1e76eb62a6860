//! Facet tables: observation samples grouped by facet column and value.

use crate::record::Record;
use std::collections::{BTreeMap, HashMap};

/// Samples for every value of one facet column, in arrival order.
pub type FacetGroups = HashMap<String, Vec<f64>>;

/// Facet column (1-indexed) → facet value → samples.
///
/// Columns are kept ordered so views iterate them by index. Values within a
/// column have no intrinsic order; use [`crate::ranking::ranked_keys`] for
/// anything user-visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetTable {
    columns: BTreeMap<usize, FacetGroups>,
}

impl FacetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the observation's value under each of its (column, value) pairs.
    /// Category records are ignored.
    pub fn apply(&mut self, record: &Record) {
        if let Record::Observation { value, facets } = record {
            for (i, facet) in facets.iter().enumerate() {
                self.columns
                    .entry(i + 1)
                    .or_default()
                    .entry(facet.clone())
                    .or_default()
                    .push(*value);
            }
        }
    }

    pub fn column(&self, column: usize) -> Option<&FacetGroups> {
        self.columns.get(&column)
    }

    pub fn samples(&self, column: usize, value: &str) -> Option<&[f64]> {
        self.columns
            .get(&column)
            .and_then(|groups| groups.get(value))
            .map(Vec::as_slice)
    }

    /// Columns in ascending index order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &FacetGroups)> {
        self.columns.iter().map(|(col, groups)| (*col, groups))
    }

    pub fn max_column(&self) -> usize {
        self.columns.keys().next_back().copied().unwrap_or(0)
    }

    /// Lowest column index containing `value`.
    pub fn first_column_containing(&self, value: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, groups)| groups.contains_key(value))
            .map(|(col, _)| *col)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(|groups| groups.is_empty())
    }

    /// Iterate every sample in every column.
    pub fn all_samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.columns
            .values()
            .flat_map(|groups| groups.values())
            .flat_map(|samples| samples.iter().copied())
    }

    /// Number of distinct values across all columns.
    pub fn key_count(&self) -> usize {
        self.columns.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_line;

    fn table(lines: &[&str]) -> FacetTable {
        let mut table = FacetTable::new();
        for line in lines {
            if let Some(record) = parse_line(line) {
                table.apply(&record);
            }
        }
        table
    }

    #[test]
    fn test_apply_groups_by_column_and_value() {
        let table = table(&["10.5\tred\tseattle", "15.2\tred\tsan jose", "8.7\tblue\tseattle"]);
        assert_eq!(table.samples(1, "red"), Some(&[10.5, 15.2][..]));
        assert_eq!(table.samples(1, "blue"), Some(&[8.7][..]));
        assert_eq!(table.samples(2, "seattle"), Some(&[10.5, 8.7][..]));
        assert_eq!(table.max_column(), 2);
        assert_eq!(table.key_count(), 4);
    }

    #[test]
    fn test_category_records_are_ignored() {
        let table = table(&["oops\tred"]);
        assert!(table.is_empty());
        assert_eq!(table.max_column(), 0);
    }

    #[test]
    fn test_ragged_rows_extend_columns() {
        let table = table(&["1\ta", "2\ta\tb\tc"]);
        assert_eq!(table.max_column(), 3);
        assert_eq!(table.samples(3, "c"), Some(&[2.0][..]));
        assert_eq!(table.samples(1, "a"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_first_column_containing_prefers_lowest_index() {
        let table = table(&["1\tx\tshared", "2\tshared\ty"]);
        assert_eq!(table.first_column_containing("shared"), Some(1));
        assert_eq!(table.first_column_containing("y"), Some(2));
        assert_eq!(table.first_column_containing("missing"), None);
    }

    #[test]
    fn test_all_samples_visits_every_group() {
        let table = table(&["1\ta\tb", "3\tc\td"]);
        let mut samples: Vec<f64> = table.all_samples().collect();
        samples.sort_by(f64::total_cmp);
        assert_eq!(samples, vec![1.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn test_value_only_observation_adds_no_columns() {
        let table = table(&["7"]);
        assert!(table.is_empty());
    }
}
