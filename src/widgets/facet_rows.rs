//! All-facets view: one heat strip per facet value, grouped by column.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::facets::FacetTable;
use crate::pins::PinSet;
use crate::ranking::ranked_keys;
use crate::statistics::{bucketize, global_range, heat_level, summary, Histogram};

pub const PIN_MARKER: &str = "📌 ";
const CELL_WIDTH: usize = 5;
const MIN_KEY_WIDTH: usize = 10;
const SCALE_EVERY: usize = 5;

/// 256-colour ramps from cold to hot, used for heat cells and the legend.
const HEAT_RAMPS: [(u8, u8); 4] = [(27, 33), (40, 46), (202, 208), (196, 201)];

/// Map a heat level in `[0, 1]` onto the blue → green → orange → red ramps.
pub fn heat_color(level: f64) -> Color {
    let index = if level < 0.25 {
        27 + (level * 24.0) as u8
    } else if level < 0.5 {
        40 + ((level - 0.25) * 24.0) as u8
    } else if level < 0.75 {
        202 + ((level - 0.5) * 24.0) as u8
    } else {
        196 + ((level - 0.75) * 20.0) as u8
    };
    Color::Indexed(index)
}

/// Every ramp colour as a two-cell swatch, ramps separated by a space.
pub fn gradient_legend() -> Line<'static> {
    let mut spans = Vec::new();
    for (start, end) in HEAT_RAMPS {
        for index in start..=end {
            spans.push(Span::styled("  ", Style::default().bg(Color::Indexed(index))));
        }
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

#[derive(Debug, Clone, Copy)]
pub struct RowStyles {
    pub text: Color,
    pub active_fg: Color,
    pub active_bg: Color,
    pub pinned: Color,
    /// Scale row text.
    pub dim: Color,
    /// Marker for buckets with no samples.
    pub empty: Color,
}

/// Lines for the aggregate view plus what navigation needs from the layout.
pub struct AggregateContent {
    pub lines: Vec<Line<'static>>,
    /// Content row of the active entry.
    pub active_line: Option<usize>,
    /// (key, (row, 0)) per entry, in address order.
    pub positions: Vec<(String, (usize, usize))>,
}

pub struct AggregateView<'a> {
    pub table: &'a FacetTable,
    pub pins: &'a PinSet,
    /// Index of the active entry in the concatenated ranked keys.
    pub active_index: Option<usize>,
    pub bucket_count: usize,
    pub styles: RowStyles,
}

fn display_width(text: &str) -> usize {
    Span::raw(text).width()
}

fn pad(text: String, width: usize) -> String {
    let fill = width.saturating_sub(display_width(&text));
    text + &" ".repeat(fill)
}

impl AggregateView<'_> {
    fn key_width(&self) -> usize {
        self.table
            .columns()
            .flat_map(|(_, groups)| groups.keys())
            .map(|key| {
                let marker = if self.pins.is_pinned(key) {
                    display_width(PIN_MARKER)
                } else {
                    0
                };
                display_width(key) + marker
            })
            .max()
            .unwrap_or(0)
            .max(MIN_KEY_WIDTH)
    }

    fn counts(&self, samples: &[f64], min: f64, max: f64) -> Vec<usize> {
        let bucket_count = self.bucket_count.max(1);
        match bucketize(samples, min, max, bucket_count) {
            Histogram::Buckets(b) => b.counts,
            Histogram::Degenerate { count, .. } => {
                let mut counts = vec![0; bucket_count];
                counts[0] = count;
                counts
            }
            Histogram::Empty => vec![0; bucket_count],
        }
    }

    fn scale_line(&self, key_width: usize, min: f64, max: f64) -> Line<'static> {
        let bucket_count = self.bucket_count.max(1);
        let width = (max - min) / bucket_count as f64;
        let mut text = " ".repeat(key_width + 4);
        for i in 0..bucket_count {
            if i % SCALE_EVERY == 0 {
                text.push_str(&format!("{:<5.1}", min + i as f64 * width));
            } else {
                text.push_str(&" ".repeat(CELL_WIDTH));
            }
        }
        text.push_str(&format!("{:<5.1}", max));
        Line::styled(text, Style::default().fg(self.styles.dim))
    }

    fn key_span(&self, key: &str, key_width: usize, active: bool) -> Span<'static> {
        let pinned = self.pins.is_pinned(key);
        let label = if pinned {
            format!("{PIN_MARKER}{key}")
        } else {
            key.to_string()
        };
        let style = match (active, pinned) {
            (true, true) => Style::default()
                .fg(self.styles.pinned)
                .bg(self.styles.active_bg)
                .add_modifier(Modifier::BOLD),
            (true, false) => Style::default()
                .fg(self.styles.active_fg)
                .bg(self.styles.active_bg)
                .add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(self.styles.pinned),
            (false, false) => Style::default().fg(self.styles.text),
        };
        Span::styled(pad(label, key_width), style)
    }

    pub fn build(&self) -> AggregateContent {
        let Some((min, max)) = global_range(self.table) else {
            return AggregateContent {
                lines: vec![Line::raw("No data yet.")],
                active_line: None,
                positions: Vec::new(),
            };
        };

        let key_width = self.key_width();
        let mut lines = Vec::new();
        let mut positions = Vec::new();
        let mut active_line = None;
        let mut entry = 0;

        for (column, groups) in self.table.columns() {
            let keys = ranked_keys(groups);
            let rows: Vec<(String, Vec<usize>)> = keys
                .into_iter()
                .map(|key| {
                    let counts = self.counts(&groups[&key], min, max);
                    (key, counts)
                })
                .collect();
            let column_max = rows
                .iter()
                .flat_map(|(_, counts)| counts.iter().copied())
                .max()
                .unwrap_or(0);

            lines.push(Line::styled(
                format!("Facet {column}:"),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            lines.push(self.scale_line(key_width, min, max));

            for (key, counts) in rows {
                let active = self.active_index == Some(entry);
                if active {
                    active_line = Some(lines.len());
                }

                let mut spans = vec![Span::raw("  "), self.key_span(&key, key_width, active)];
                spans.push(Span::raw("  "));
                for count in counts {
                    if count == 0 {
                        spans.push(Span::styled(
                            "·    ",
                            Style::default().fg(self.styles.empty),
                        ));
                    } else {
                        let color = heat_color(heat_level(count, column_max));
                        spans.push(Span::styled(" ", Style::default().bg(color)));
                        spans.push(Span::raw(" ".repeat(CELL_WIDTH - 1)));
                    }
                }
                let s = summary(&groups[&key]);
                spans.push(Span::raw(format!(
                    " μ={:.2} σ={:.2} n={}",
                    s.mean, s.std_dev, s.count
                )));

                positions.push((key, (entry, 0)));
                lines.push(Line::from(spans));
                entry += 1;
            }
            lines.push(Line::raw(""));
        }
        lines.push(gradient_legend());

        AggregateContent {
            lines,
            active_line,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_line;

    fn styles() -> RowStyles {
        RowStyles {
            text: Color::White,
            active_fg: Color::White,
            active_bg: Color::Indexed(23),
            pinned: Color::Indexed(205),
            dim: Color::DarkGray,
            empty: Color::Indexed(52),
        }
    }

    fn table(lines: &[&str]) -> FacetTable {
        let mut table = FacetTable::new();
        for line in lines {
            table.apply(&parse_line(line).unwrap());
        }
        table
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_heat_color_ramps() {
        assert_eq!(heat_color(0.0), Color::Indexed(27));
        assert_eq!(heat_color(0.3), Color::Indexed(41));
        assert_eq!(heat_color(0.6), Color::Indexed(204));
        assert_eq!(heat_color(1.0), Color::Indexed(201));
    }

    #[test]
    fn test_empty_table_has_placeholder() {
        let table = FacetTable::new();
        let pins = PinSet::new();
        let content = AggregateView {
            table: &table,
            pins: &pins,
            active_index: None,
            bucket_count: 20,
            styles: styles(),
        }
        .build();
        assert_eq!(content.lines.len(), 1);
        assert!(content.positions.is_empty());
    }

    #[test]
    fn test_rows_follow_ranked_order_per_column() {
        let table = table(&[
            "10.5\tred\tseattle",
            "15.2\tred\tsan jose",
            "8.7\tblue\tseattle",
            "12.1\tblue\tsan jose",
        ]);
        let pins = PinSet::new();
        let content = AggregateView {
            table: &table,
            pins: &pins,
            active_index: Some(2),
            bucket_count: 20,
            styles: styles(),
        }
        .build();

        let keys: Vec<&str> = content.positions.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["red", "blue", "san jose", "seattle"]);
        assert_eq!(content.positions[2].1, (2, 0));

        // header, scale, red, blue, blank, header, scale, san jose
        assert_eq!(content.active_line, Some(7));
        let active = plain(&content.lines[7]);
        assert!(active.contains("san jose"));
        assert!(active.contains("μ=13.65 σ=1.55 n=2"));
        assert_eq!(plain(&content.lines[0]), "Facet 1:");
    }

    #[test]
    fn test_pinned_key_is_marked() {
        let table = table(&["1\tred", "2\tblue"]);
        let mut pins = PinSet::new();
        pins.toggle("red", 1);
        let content = AggregateView {
            table: &table,
            pins: &pins,
            active_index: None,
            bucket_count: 4,
            styles: styles(),
        }
        .build();
        assert!(content
            .lines
            .iter()
            .any(|line| plain(line).contains("📌 red")));
    }

    #[test]
    fn test_degenerate_range_fills_first_bucket() {
        let table = table(&["5\ta", "5\ta"]);
        let pins = PinSet::new();
        let view = AggregateView {
            table: &table,
            pins: &pins,
            active_index: None,
            bucket_count: 4,
            styles: styles(),
        };
        assert_eq!(view.counts(&[5.0, 5.0], 5.0, 5.0), vec![2, 0, 0, 0]);
    }

    #[test]
    fn test_empty_buckets_use_their_own_colour() {
        let table = table(&["1\ta", "3\tb"]);
        let pins = PinSet::new();
        let content = AggregateView {
            table: &table,
            pins: &pins,
            active_index: None,
            bucket_count: 4,
            styles: styles(),
        }
        .build();
        let markers: Vec<_> = content
            .lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.content.starts_with('·'))
            .collect();
        assert_eq!(markers.len(), 6);
        assert!(markers
            .iter()
            .all(|span| span.style.fg == Some(Color::Indexed(52))));
        assert_eq!(content.lines[1].style.fg, Some(Color::DarkGray));
    }
}
