use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

/// Throughput and selection summary shown on the top row.
pub struct Header<'a> {
    pub rate: f64,
    pub total: usize,
    /// (column, value) in display order.
    pub pins: Vec<(usize, &'a str)>,
    pub active: Option<&'a str>,
    pub streaming: bool,
    pub started: &'a str,
    pub fg: Color,
    pub bg: Color,
}

impl Header<'_> {
    pub fn text(&self) -> String {
        let mut text = format!(
            "Rate: {:.2} records/sec | Total: {}",
            self.rate, self.total
        );
        if !self.pins.is_empty() {
            let pins: Vec<String> = self
                .pins
                .iter()
                .map(|(column, value)| format!("{column}:{value}"))
                .collect();
            text.push_str(&format!(" | Pins: {} (filtered)", pins.join(", ")));
        }
        if let Some(active) = self.active {
            text.push_str(&format!(" | Active: {active}"));
        }
        let state = if self.streaming { "streaming" } else { "closed" };
        text.push_str(&format!(" | Input: {state} since {}", self.started));
        text
    }
}

impl Widget for &Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.text())
            .style(
                Style::default()
                    .fg(self.fg)
                    .bg(self.bg)
                    .add_modifier(Modifier::BOLD),
            )
            .render(area, buf);
    }
}

/// Records per second since `elapsed_secs`; zero before any time has passed.
pub fn record_rate(total: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        total as f64 / elapsed_secs
    } else {
        0.0
    }
}
