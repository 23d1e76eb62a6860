use crossterm::event::KeyEvent;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Counters shown in the `--debug` status row.
#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub events: usize,
    pub frames: usize,
    pub keys: usize,
    /// Code and kind of the most recent key, e.g. `Enter/Press`.
    pub last_key: String,
    /// Name of the handler that ran for the last key.
    pub last_action: String,
    /// Lines applied by the most recent tick.
    pub drained: usize,
    pub input_closed: bool,
}

impl DebugState {
    pub fn on_key(&mut self, event: &KeyEvent) {
        self.keys += 1;
        self.last_key = format!("{:?}/{:?}", event.code, event.kind);
    }

    fn fields(&self) -> [(&'static str, String); 7] {
        [
            ("events", self.events.to_string()),
            ("frames", self.frames.to_string()),
            ("keys", self.keys.to_string()),
            ("key", self.last_key.clone()),
            ("action", self.last_action.clone()),
            ("drained", self.drained.to_string()),
            ("input", if self.input_closed { "closed" } else { "open" }.to_string()),
        ]
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans = self.fields().into_iter().flat_map(|(name, value)| {
            [
                Span::styled(format!("{name}="), Style::default().dim()),
                Span::raw(format!("{value} ")),
            ]
        });
        Paragraph::new(Line::from_iter(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_status_row_lists_counters() {
        let mut state = DebugState {
            events: 3,
            drained: 12,
            ..Default::default()
        };
        state.on_key(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        (&state).render(area, &mut buf);
        let row: String = (0..area.width).map(|x| buf[(x, 0)].symbol()).collect();
        assert!(row.contains("events=3"));
        assert!(row.contains("keys=1"));
        assert!(row.contains("drained=12"));
        assert!(row.contains("input=open"));
    }
}
