//! Deterministic orderings over facet groups and string counts.

use crate::facets::{FacetGroups, FacetTable};
use crate::statistics::mean;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Descending by mean; IEEE total order only where the means are unordered (NaN).
fn by_mean_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| b.total_cmp(&a))
}

/// Keys of `groups` sorted by descending mean of their samples, ties broken
/// by ascending key.
pub fn ranked_keys(groups: &FacetGroups) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = groups
        .iter()
        .map(|(key, samples)| (key, mean(samples)))
        .collect();
    ranked.sort_by(|(ka, ma), (kb, mb)| by_mean_desc(*ma, *mb).then_with(|| ka.cmp(kb)));
    ranked.into_iter().map(|(key, _)| key.clone()).collect()
}

/// One entry of the aggregate (all facets) address list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetEntry {
    pub column: usize,
    pub key: String,
}

/// Every column's ranked keys, concatenated in column order.
pub fn aggregate_entries(table: &FacetTable) -> Vec<FacetEntry> {
    table
        .columns()
        .flat_map(|(column, groups)| {
            ranked_keys(groups)
                .into_iter()
                .map(move |key| FacetEntry { column, key })
        })
        .collect()
}

/// String values sorted by descending count, ties broken by ascending value.
pub fn ranked_string_counts(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.iter().map(|(v, c)| (v.clone(), *c)).collect();
    ranked.sort_by(|(va, ca), (vb, cb)| cb.cmp(ca).then_with(|| va.cmp(vb)));
    ranked
}
