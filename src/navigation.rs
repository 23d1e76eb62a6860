//! Selection and scrolling state for the facet views.
//!
//! Two address spaces exist. The aggregate view lists every column's ranked
//! keys one after another and moves vertically only. The single-column view
//! lays that column's ranked keys out row-major in a grid of
//! `grid_columns` and rejects moves that would leave it.

use crate::facets::FacetTable;
use crate::ranking::{aggregate_entries, ranked_keys};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Every facet column, one row per facet value.
    #[default]
    AllFacets,
    /// A single facet column (1-indexed) as a grid of panels.
    Column(usize),
}

impl ViewMode {
    /// 0 for the aggregate view, otherwise the column index.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            ViewMode::AllFacets
        } else {
            ViewMode::Column(index)
        }
    }

    pub fn index(self) -> usize {
        match self {
            ViewMode::AllFacets => 0,
            ViewMode::Column(c) => c,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    mode: ViewMode,
    active: Option<String>,
    /// Linear index of `active` in the current ordering when last resolved.
    active_index: usize,
    /// (row, col) of `active` in the current layout.
    active_pos: (usize, usize),
    /// Addresses recorded by the most recent render pass.
    positions: HashMap<String, (usize, usize)>,
    grid_columns: usize,
    scroll: usize,
    follow_active: bool,
}

impl Navigator {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            grid_columns: 1,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The column in focus when a single column is shown.
    pub fn focus_column(&self) -> Option<usize> {
        match self.mode {
            ViewMode::AllFacets => None,
            ViewMode::Column(c) => Some(c),
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_position(&self) -> (usize, usize) {
        self.active_pos
    }

    pub fn position_of(&self, key: &str) -> Option<(usize, usize)> {
        self.positions.get(key).copied()
    }

    pub fn grid_columns(&self) -> usize {
        self.grid_columns
    }

    pub fn set_grid_columns(&mut self, columns: usize) {
        self.grid_columns = columns.max(1);
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Ordered keys addressable in the current view.
    pub fn ordering(&self, table: &FacetTable) -> Vec<String> {
        match self.mode {
            ViewMode::AllFacets => aggregate_entries(table)
                .into_iter()
                .map(|entry| entry.key)
                .collect(),
            ViewMode::Column(c) => table.column(c).map(ranked_keys).unwrap_or_default(),
        }
    }

    /// Index of the active key in `ordering`, preferring the remembered index
    /// so a value repeated in several columns keeps its place.
    pub fn active_index_in(&self, ordering: &[String]) -> Option<usize> {
        let active = self.active.as_deref()?;
        if ordering.get(self.active_index).map(String::as_str) == Some(active) {
            return Some(self.active_index);
        }
        ordering.iter().position(|key| key == active)
    }

    fn select(&mut self, ordering: &[String], index: usize) {
        self.active = ordering.get(index).cloned();
        self.active_index = index;
        self.active_pos = self.address_of(index);
        self.follow_active = true;
    }

    fn address_of(&self, index: usize) -> (usize, usize) {
        match self.mode {
            ViewMode::AllFacets => (index, 0),
            ViewMode::Column(_) => {
                let columns = self.grid_columns.max(1);
                (index / columns, index % columns)
            }
        }
    }

    /// Select the first key of the current view (or nothing when it is empty).
    pub fn reset_active(&mut self, table: &FacetTable) {
        let ordering = self.ordering(table);
        if ordering.is_empty() {
            self.active = None;
            self.active_index = 0;
            self.active_pos = (0, 0);
        } else {
            self.select(&ordering, 0);
        }
    }

    /// Keep the selection addressable after the data source changed.
    ///
    /// Resets to the first key when the active value no longer resolves.
    pub fn revalidate(&mut self, table: &FacetTable) {
        let ordering = self.ordering(table);
        match self.active_index_in(&ordering) {
            Some(index) => {
                self.active_index = index;
                self.active_pos = self.address_of(index);
            }
            None => self.reset_active(table),
        }
    }

    /// Step the facet column by `delta`, clamped to `[0, table.max_column()]`.
    /// Returns whether the view changed.
    pub fn switch_column(&mut self, delta: isize, table: &FacetTable) -> bool {
        let max = table.max_column() as isize;
        let current = self.mode.index() as isize;
        let target = (current + delta).clamp(0, max.max(0));
        if target == current {
            return false;
        }
        self.set_mode(ViewMode::from_index(target as usize), table);
        true
    }

    /// Show every facet column again.
    pub fn reset_to_all(&mut self, table: &FacetTable) {
        self.set_mode(ViewMode::AllFacets, table);
    }

    /// Change the view; the active value survives when the new view still
    /// contains it.
    pub fn set_mode(&mut self, mode: ViewMode, table: &FacetTable) {
        self.mode = mode;
        self.scroll = 0;
        self.positions.clear();
        self.follow_active = true;
        self.revalidate(table);
    }

    /// Move the selection by (dx, dy). Returns whether the selection changed.
    ///
    /// With no resolvable selection the first key is selected instead.
    pub fn move_selection(&mut self, table: &FacetTable, dx: isize, dy: isize) -> bool {
        let ordering = self.ordering(table);
        if ordering.is_empty() {
            return false;
        }
        let Some(current) = self.active_index_in(&ordering) else {
            self.select(&ordering, 0);
            return true;
        };

        let target = match self.mode {
            ViewMode::AllFacets => {
                if dy == 0 {
                    return false;
                }
                if dy > 0 {
                    (current + 1).min(ordering.len() - 1)
                } else {
                    current.saturating_sub(1)
                }
            }
            ViewMode::Column(_) => {
                let columns = self.grid_columns.max(1) as isize;
                let row = current as isize / columns + dy;
                let col = current as isize % columns + dx;
                if row < 0 || col < 0 || col >= columns {
                    return false;
                }
                let index = (row * columns + col) as usize;
                if index >= ordering.len() {
                    return false;
                }
                index
            }
        };

        if target == current {
            return false;
        }
        self.select(&ordering, target);
        true
    }

    /// Replace the address memo with the layout of the latest render pass.
    pub fn record_positions<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (String, (usize, usize))>,
    {
        self.positions.clear();
        for (key, pos) in positions {
            self.positions.entry(key).or_insert(pos);
        }
        // aggregate addresses come from active_index since keys may repeat
        if let (ViewMode::Column(_), Some(active)) = (self.mode, self.active.as_deref()) {
            if let Some(pos) = self.positions.get(active) {
                self.active_pos = *pos;
            }
        }
    }

    /// Scroll the content by `delta` rows, never above the top.
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.follow_active = false;
    }

    /// Clamp the scroll offset to the rendered content.
    pub fn clamp_scroll(&mut self, max_scroll: usize) {
        self.scroll = self.scroll.min(max_scroll);
    }

    /// Scroll so rows `[top, top + height)` are inside a viewport of
    /// `viewport` rows. Only applies after a selection change, so manual
    /// scrolling is not undone on the next frame.
    pub fn follow(&mut self, top: usize, height: usize, viewport: usize) {
        if !self.follow_active {
            return;
        }
        self.follow_active = false;
        let viewport = viewport.max(1);
        if top < self.scroll {
            self.scroll = top;
        } else if top + height > self.scroll + viewport {
            self.scroll = (top + height).saturating_sub(viewport).min(top);
        }
    }
}
