use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const KEY_HINTS: [(&str, &str); 7] = [
    ("a/d", "Facet"),
    ("←→↑↓", "Navigate"),
    ("Enter", "Pin"),
    ("0", "All Facets"),
    ("j/k", "Scroll"),
    ("s", "Stats"),
    ("q", "Quit"),
];

/// Key hints plus the record count on the bottom row.
pub struct Controls {
    pub records: usize,
    /// Highlights the `Stats` hint while panels show summaries.
    pub stats_active: bool,
    pub fg: Color,
    pub bg: Color,
}

impl Controls {
    pub fn with_record_count(records: usize) -> Self {
        Self {
            records,
            stats_active: false,
            fg: Color::White,
            bg: Color::DarkGray,
        }
    }

    pub fn with_stats_active(mut self, stats_active: bool) -> Self {
        self.stats_active = stats_active;
        self
    }

    pub fn with_colors(mut self, fg: Color, bg: Color) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }

    fn hints(&self) -> Line<'static> {
        let spans = KEY_HINTS.iter().flat_map(|&(key, action)| {
            let label = if action == "Stats" && self.stats_active {
                Span::styled(action, Style::default().fg(Color::Cyan))
            } else {
                Span::raw(action)
            };
            [Span::raw(" "), Span::raw(key).bold(), Span::raw(" "), label]
        });
        Line::from_iter(spans)
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = format!("Records: {} ", self.records);
        let [hints, records] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(count.chars().count() as u16),
        ])
        .areas(area);

        let style = Style::default().fg(self.fg).bg(self.bg);
        Paragraph::new(self.hints()).style(style).render(hints, buf);
        Paragraph::new(count)
            .style(style)
            .right_aligned()
            .render(records, buf);
    }
}
