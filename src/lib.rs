use chrono::{DateTime, Local};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use ratatui::style::{Color, Style};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

pub mod config;
pub mod engine;
pub mod facets;
pub mod ingest;
pub mod layout;
pub mod navigation;
pub mod pins;
pub mod ranking;
pub mod record;
pub mod statistics;
pub mod widgets;

pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use engine::FacetEngine;
pub use facetscope_cli::{Args, CompressionFormat};
pub use ingest::{InputSource, LineIngestor};
pub use navigation::{Navigator, ViewMode};

use layout::{app_layout, grid_columns};
use ranking::{ranked_keys, ranked_string_counts};
use statistics::global_range;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::facet_grid::{FacetGrid, PanelStyles};
use widgets::facet_rows::{AggregateView, RowStyles};
use widgets::header::{record_rate, Header};
use widgets::string_counts::string_count_lines;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "facetscope";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Periodic refresh: drain the input queue.
    Tick,
    /// A batch of raw lines to apply.
    Lines(Vec<String>),
    Exit,
    Resize(u16, u16), // resized (width, height)
}

pub struct App {
    engine: FacetEngine,
    nav: Navigator,
    ingestor: Option<LineIngestor>,
    stats: bool,
    config: AppConfig,
    theme: Theme,
    debug: DebugState,
    started: DateTime<Local>,
}

impl App {
    pub fn new() -> Result<Self> {
        Self::new_with_config(AppConfig::default())
    }

    pub fn new_with_config(config: AppConfig) -> Result<Self> {
        let theme = Theme::from_config(&config.theme)?;
        let debug = DebugState {
            enabled: config.debug.enabled,
            ..Default::default()
        };

        Ok(Self {
            engine: FacetEngine::new(),
            nav: Navigator::new(ViewMode::AllFacets),
            ingestor: None,
            stats: config.display.stats,
            config,
            theme,
            debug,
            started: Local::now(),
        })
    }

    /// Start on facet column `index` (0 for every column).
    pub fn with_initial_facet(mut self, index: usize) -> Self {
        self.nav
            .set_mode(ViewMode::from_index(index), self.engine.active_table());
        self
    }

    pub fn attach_input(&mut self, ingestor: LineIngestor) {
        self.ingestor = Some(ingestor);
    }

    pub fn engine(&self) -> &FacetEngine {
        &self.engine
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn stats_enabled(&self) -> bool {
        self.stats
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn elapsed_secs(&self) -> f64 {
        (Local::now() - self.started).num_milliseconds() as f64 / 1000.0
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Tick => {
                let ingestor = self.ingestor.as_mut()?;
                let lines = ingestor.drain(self.config.ingest.max_lines_per_tick);
                self.debug.input_closed = ingestor.is_closed();
                self.debug.drained = lines.len();
                if lines.is_empty() {
                    None
                } else {
                    Some(AppEvent::Lines(lines))
                }
            }
            AppEvent::Lines(lines) => {
                self.ingest_lines(lines);
                None
            }
            AppEvent::Resize(cols, rows) => {
                log::debug!("terminal resized to {cols}x{rows}");
                None
            }
            AppEvent::Exit => None,
        }
    }

    fn ingest_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.engine.ingest(line);
        }
        self.nav.revalidate(self.engine.active_table());
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(event);

        let table = self.engine.active_table();
        let action = match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Char('a') => {
                self.nav.switch_column(-1, table);
                "previous_facet"
            }
            KeyCode::Char('d') => {
                self.nav.switch_column(1, table);
                "next_facet"
            }
            KeyCode::Char('0') => {
                self.nav.reset_to_all(table);
                "all_facets"
            }
            KeyCode::Left => {
                self.nav.move_selection(table, -1, 0);
                "move_left"
            }
            KeyCode::Right => {
                self.nav.move_selection(table, 1, 0);
                "move_right"
            }
            KeyCode::Up => {
                self.nav.move_selection(table, 0, -1);
                "move_up"
            }
            KeyCode::Down => {
                self.nav.move_selection(table, 0, 1);
                "move_down"
            }
            KeyCode::Char('j') => {
                self.nav.scroll_by(1);
                "scroll_down"
            }
            KeyCode::Char('k') => {
                self.nav.scroll_by(-1);
                "scroll_up"
            }
            KeyCode::Char('s') => {
                self.stats = !self.stats;
                "toggle_stats"
            }
            KeyCode::Enter => {
                self.toggle_active_pin();
                "toggle_pin"
            }
            _ => return None,
        };
        self.debug.last_action = action.to_string();
        None
    }

    fn toggle_active_pin(&mut self) {
        let Some(active) = self.nav.active().map(str::to_string) else {
            return;
        };
        if self
            .engine
            .toggle_pin(&active, self.nav.focus_column())
            .is_some()
        {
            self.nav.revalidate(self.engine.active_table());
        }
    }

    fn row_styles(&self) -> RowStyles {
        RowStyles {
            text: self.color("text_primary"),
            active_fg: self.color("header_fg"),
            active_bg: self.color("active_bg"),
            pinned: self.color("pinned"),
            dim: self.color("text_secondary"),
            empty: self.color("empty_bucket"),
        }
    }

    fn panel_styles(&self) -> PanelStyles {
        PanelStyles {
            border: self.color("panel_border"),
            active: self.color("active"),
            active_bg: self.color("active_bg"),
            pinned: self.color("pinned"),
            bar: self.color("bar"),
            text: self.color("text_primary"),
        }
    }

    fn render_lines(&mut self, lines: Vec<ratatui::text::Line<'static>>, area: Rect, buf: &mut Buffer) {
        self.nav
            .clamp_scroll(lines.len().saturating_sub(area.height as usize));
        let offset = u16::try_from(self.nav.scroll()).unwrap_or(u16::MAX);
        Paragraph::new(lines).scroll((offset, 0)).render(area, buf);
    }

    fn render_content(&mut self, area: Rect, buf: &mut Buffer) {
        let viewport = area.height as usize;

        if self.engine.has_string_values() {
            let ranked = ranked_string_counts(self.engine.string_counts());
            let lines = string_count_lines(&ranked, area.width);
            self.render_lines(lines, area, buf);
            return;
        }

        match self.nav.mode() {
            ViewMode::AllFacets => {
                let table = self.engine.active_table();
                let ordering = self.nav.ordering(table);
                let content = AggregateView {
                    table,
                    pins: self.engine.pins(),
                    active_index: self.nav.active_index_in(&ordering),
                    bucket_count: self.config.display.aggregate_buckets,
                    styles: self.row_styles(),
                }
                .build();
                self.nav.record_positions(content.positions);
                if let Some(line) = content.active_line {
                    self.nav.follow(line, 1, viewport);
                }
                self.render_lines(content.lines, area, buf);
            }
            ViewMode::Column(column) => {
                let display = &self.config.display;
                let columns = grid_columns(area.width, display.panel_width);
                if columns != self.nav.grid_columns() {
                    self.nav.set_grid_columns(columns);
                    self.nav.revalidate(self.engine.active_table());
                }

                let table = self.engine.active_table();
                let Some(groups) = table.column(column) else {
                    Paragraph::new("Facet not available yet.").render(area, buf);
                    return;
                };
                let Some(range) = global_range(table) else {
                    Paragraph::new("No data yet.").render(area, buf);
                    return;
                };

                let keys = ranked_keys(groups);
                let active = self.nav.active().map(str::to_string);
                let mut grid = FacetGrid {
                    groups,
                    keys: &keys,
                    pins: self.engine.pins(),
                    active: active.as_deref(),
                    range,
                    stats: self.stats,
                    bucket_count: display.panel_buckets,
                    bar_height: display.panel_bar_height,
                    panel_width: display.panel_width,
                    columns,
                    scroll: 0,
                    styles: self.panel_styles(),
                };

                self.nav.record_positions(grid.positions());
                let panel_height = grid.panel_height() as usize;
                if let Some((row, _)) = active.as_deref().and_then(|k| self.nav.position_of(k)) {
                    self.nav.follow(row * panel_height, panel_height, viewport);
                }
                self.nav
                    .clamp_scroll(grid.content_height().saturating_sub(viewport));
                grid.scroll = self.nav.scroll();
                (&grid).render(area, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.frames += 1;
        let layout = app_layout(area, self.debug.enabled);

        let streaming = self
            .ingestor
            .as_ref()
            .is_some_and(|ingestor| !ingestor.is_closed());
        let started = self.started.format("%H:%M:%S").to_string();
        let header = Header {
            rate: record_rate(self.engine.total_records(), self.elapsed_secs()),
            total: self.engine.total_records(),
            pins: self
                .engine
                .pins()
                .iter()
                .map(|(value, column)| (column, value))
                .collect(),
            active: self.nav.active(),
            streaming,
            started: &started,
            fg: self.color("header_fg"),
            bg: self.color("header_bg"),
        };
        (&header).render(layout.header, buf);

        self.render_content(layout.main_view, buf);

        let controls = Controls::with_record_count(self.engine.total_records())
            .with_stats_active(self.stats)
            .with_colors(self.color("text_primary"), self.color("controls_bg"));
        (&controls).render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            Paragraph::new("")
                .style(Style::default().bg(self.color("controls_bg")))
                .render(debug_area, buf);
            (&self.debug).render(debug_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(lines: &[&str]) -> App {
        let mut app = App::new().unwrap();
        app.event(&AppEvent::Lines(lines.iter().map(|l| l.to_string()).collect()));
        app
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new().unwrap();
        assert_eq!(app.event(&press(KeyCode::Char('q'))), Some(AppEvent::Exit));
        assert_eq!(app.event(&press(KeyCode::Esc)), Some(AppEvent::Exit));
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.event(&ctrl_c), Some(AppEvent::Exit));
    }

    #[test]
    fn test_lines_select_first_ranked_key() {
        let app = app_with(&["1\tlow", "9\thigh"]);
        assert_eq!(app.navigator().active(), Some("high"));
        assert_eq!(app.engine().total_records(), 2);
    }

    #[test]
    fn test_stats_toggle() {
        let mut app = App::new().unwrap();
        assert!(!app.stats_enabled());
        app.event(&press(KeyCode::Char('s')));
        assert!(app.stats_enabled());
    }

    #[test]
    fn test_tick_without_input_is_idle() {
        let mut app = App::new().unwrap();
        assert_eq!(app.event(&AppEvent::Tick), None);
    }

    #[test]
    fn test_render_does_not_panic_on_tiny_area() {
        let mut app = app_with(&["1\ta\tb", "2\tc\td"]);
        for area in [Rect::new(0, 0, 1, 1), Rect::new(0, 0, 10, 3), Rect::new(0, 0, 0, 0)] {
            let mut buf = Buffer::empty(area);
            (&mut app).render(area, &mut buf);
        }
        app.event(&press(KeyCode::Char('d')));
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
    }
}
