//! Single-column view: a grid of bordered panels, one per facet value.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::facets::FacetGroups;
use crate::layout::panel_rect;
use crate::pins::PinSet;
use crate::statistics::{bucketize, summary, Histogram};
use crate::widgets::facet_rows::PIN_MARKER;

const STATS_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy)]
pub struct PanelStyles {
    pub border: Color,
    pub active: Color,
    pub active_bg: Color,
    pub pinned: Color,
    pub bar: Color,
    pub text: Color,
}

/// Panel body: either a vertical histogram or summary statistics.
pub fn panel_body(
    samples: &[f64],
    range: (f64, f64),
    stats: bool,
    bucket_count: usize,
    bar_height: usize,
) -> Vec<String> {
    if stats {
        let s = summary(samples);
        return vec![
            format!("Mean: {:.2}", s.mean),
            format!("Std Dev: {:.2}", s.std_dev),
            format!("Count: {}", s.count),
        ];
    }

    match bucketize(samples, range.0, range.1, bucket_count) {
        Histogram::Empty => vec!["No data".to_string()],
        Histogram::Degenerate { value, .. } => {
            let mut rows = vec!["███".to_string(); bar_height];
            rows.push(format!("{value:.2}"));
            rows
        }
        Histogram::Buckets(buckets) => {
            let labels: Vec<String> = (0..buckets.counts.len())
                .map(|i| format!("{:4.1}", buckets.midpoint(i)))
                .collect();
            let cell = labels.iter().map(String::len).max().unwrap_or(4) + 1;
            let heights = buckets.bar_heights(bar_height);

            let mut rows = Vec::with_capacity(bar_height + 1);
            for level in (1..=bar_height).rev() {
                let row: String = heights
                    .iter()
                    .map(|&h| {
                        if h >= level {
                            format!("{} ", "█".repeat(cell - 1))
                        } else {
                            " ".repeat(cell)
                        }
                    })
                    .collect();
                rows.push(row.trim_end().to_string());
            }
            rows.push(
                labels
                    .iter()
                    .map(|label| format!("{label:>width$}", width = cell - 1))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            rows
        }
    }
}

pub struct FacetGrid<'a> {
    pub groups: &'a FacetGroups,
    /// Keys in ranked order; index `i` sits at `(i / columns, i % columns)`.
    pub keys: &'a [String],
    pub pins: &'a PinSet,
    pub active: Option<&'a str>,
    pub range: (f64, f64),
    pub stats: bool,
    pub bucket_count: usize,
    pub bar_height: usize,
    pub panel_width: u16,
    pub columns: usize,
    /// First content row shown, in terminal rows.
    pub scroll: usize,
    pub styles: PanelStyles,
}

impl FacetGrid<'_> {
    /// Rows of one panel including borders, title and spacer.
    pub fn panel_height(&self) -> u16 {
        let body = if self.stats {
            STATS_ROWS
        } else {
            u16::try_from(self.bar_height)
                .unwrap_or(u16::MAX)
                .saturating_add(1)
        };
        body.saturating_add(4)
    }

    pub fn content_height(&self) -> usize {
        let columns = self.columns.max(1);
        self.keys.len().div_ceil(columns) * self.panel_height() as usize
    }

    /// (key, (row, col)) for every panel.
    pub fn positions(&self) -> Vec<(String, (usize, usize))> {
        let columns = self.columns.max(1);
        self.keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), (i / columns, i % columns)))
            .collect()
    }

    fn block(&self, key: &str) -> Block<'static> {
        let active = self.active == Some(key);
        let pinned = self.pins.is_pinned(key);
        let (border_type, border_style) = match (active, pinned) {
            (true, true) => (
                BorderType::Thick,
                Style::default().fg(self.styles.pinned).bg(self.styles.active_bg),
            ),
            (true, false) => (
                BorderType::Thick,
                Style::default().fg(self.styles.active).bg(self.styles.active_bg),
            ),
            (false, true) => (BorderType::Double, Style::default().fg(self.styles.pinned)),
            (false, false) => (BorderType::Rounded, Style::default().fg(self.styles.border)),
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(border_style)
    }

    fn render_panel(&self, key: &str, area: Rect, buf: &mut Buffer) {
        let block = self.block(key);
        let inner = block.inner(area);
        block.render(area, buf);

        let title = if self.pins.is_pinned(key) {
            format!("{PIN_MARKER}{key}")
        } else {
            key.to_string()
        };
        let mut lines = vec![
            Line::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Line::raw(""),
        ];
        let samples = self.groups.get(key).map(Vec::as_slice).unwrap_or_default();
        let body_style = if self.stats {
            Style::default().fg(self.styles.text)
        } else {
            Style::default().fg(self.styles.bar)
        };
        lines.extend(
            panel_body(samples, self.range, self.stats, self.bucket_count, self.bar_height)
                .into_iter()
                .map(|row| Line::styled(row, body_style)),
        );
        Paragraph::new(lines).render(inner, buf);
    }
}

impl Widget for &FacetGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let columns = self.columns.max(1);
        let panel_height = self.panel_height() as usize;
        let first_row = self.scroll / panel_height;
        let offset = self.scroll % panel_height;
        let rows = (offset + area.height as usize).div_ceil(panel_height);

        // Draw the visible panel rows off-screen, then copy the scrolled window.
        let scratch_height = u16::try_from(rows * panel_height).unwrap_or(u16::MAX);
        let scratch_area = Rect::new(0, 0, area.width, scratch_height);
        let mut scratch = Buffer::empty(scratch_area);
        for visible_row in 0..rows {
            for col in 0..columns {
                let index = (first_row + visible_row) * columns + col;
                let Some(key) = self.keys.get(index) else {
                    break;
                };
                if let Some(rect) = panel_rect(
                    scratch_area,
                    col,
                    visible_row,
                    self.panel_width,
                    self.panel_height(),
                ) {
                    self.render_panel(key, rect, &mut scratch);
                }
            }
        }

        for y in 0..area.height {
            let source_y = offset + y as usize;
            if source_y >= scratch_area.height as usize {
                break;
            }
            for x in 0..area.width {
                buf[(area.x + x, area.y + y)] = scratch[(x, source_y as u16)].clone();
            }
        }
    }
}
