use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::ingest::DEFAULT_QUEUE_CAPACITY;
use crate::Args;

const CONFIG_FILE: &str = "config.toml";
const COLOR_MODES: [&str; 3] = ["auto", "dark", "light"];
/// Tallest panel histogram accepted from the config.
pub const MAX_PANEL_BAR_HEIGHT: usize = 1000;

/// Locates the per-user config directory and reads or writes `config.toml` in it.
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Use `config_dir` instead of the platform location.
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        match dirs::config_dir() {
            Some(base) => Ok(Self::with_dir(base.join(app_name))),
            None => Err(eyre!("No platform config directory available")),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| {
            eyre!(
                "Cannot create config directory {}: {}",
                self.config_dir.display(),
                e
            )
        })
    }

    /// The commented template written by `--generate-config`.
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write the template, refusing to replace an existing file unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let target = self.config_path(CONFIG_FILE);
        if !force && target.exists() {
            return Err(eyre!(
                "{} already exists; pass --force to replace it",
                target.display()
            ));
        }
        self.ensure_config_dir()?;
        std::fs::write(&target, self.generate_default_config())?;
        Ok(target)
    }

    /// Read and parse `config.toml`; defaults when the file does not exist.
    pub fn load_file(&self) -> Result<AppConfig> {
        let path = self.config_path(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AppConfig::default())
            }
            Err(e) => return Err(eyre!("Failed to read config file at {}: {}", path.display(), e)),
        };
        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", path.display(), e))
    }
}

/// Everything read from `config.toml`; missing keys fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Must start with `0.1`
    pub version: String,
    pub ingest: IngestConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Lines buffered between the reader thread and the display
    pub queue_capacity: usize,
    /// Interval between queue drains
    pub tick_interval_ms: u64,
    /// Upper bound on lines applied per drain so input bursts cannot starve the UI
    pub max_lines_per_tick: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Buckets per row in the all-facets heat strip
    pub aggregate_buckets: usize,
    /// Bars per panel in the single-facet view
    pub panel_buckets: usize,
    /// Height of panel histograms in rows
    pub panel_bar_height: usize,
    /// Width of one panel in the single-facet view
    pub panel_width: u16,
    /// Start with mean/stdev panels instead of histograms
    pub stats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub header_bg: String,
    pub header_fg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub controls_bg: String,
    pub panel_border: String,
    pub active: String,
    pub active_bg: String,
    pub pinned: String,
    pub bar: String,
    pub empty_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; logging is disabled when unset
    pub file: Option<PathBuf>,
    /// Default filter when RUST_LOG is not set (e.g. "info", "facetscope=debug")
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            ingest: IngestConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick_interval_ms: 500,
            max_lines_per_tick: 100_000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            aggregate_buckets: 20,
            panel_buckets: 10,
            panel_bar_height: 10,
            panel_width: 60,
            stats: false,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            header_bg: "blue".to_string(),
            header_fg: "bright_white".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            panel_border: "indexed(250)".to_string(),
            active: "indexed(39)".to_string(),
            active_bg: "indexed(23)".to_string(),
            pinned: "indexed(205)".to_string(),
            bar: "white".to_string(),
            empty_bucket: "dark_gray".to_string(),
        }
    }
}


impl AppConfig {
    /// Built-in defaults overlaid with the user's `config.toml`, validated.
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        match ConfigManager::new(app_name) {
            Ok(manager) => config.merge(manager.load_file()?),
            Err(e) => log::warn!("no user config loaded: {e}"),
        }

        config.validate()?;

        Ok(config)
    }

    /// Apply command-line overrides on top of the file layers.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(capacity) = args.queue_capacity {
            self.ingest.queue_capacity = capacity;
        }
        if let Some(tick) = args.tick_interval_ms {
            self.ingest.tick_interval_ms = tick;
        }
        if args.stats {
            self.display.stats = true;
        }
        if args.debug {
            self.debug.enabled = true;
        }
        if args.log_file.is_some() {
            self.logging.file = args.log_file.clone();
        }
    }

    /// Layer `other` over `self`; only non-default values in `other` win.
    pub fn merge(&mut self, other: AppConfig) {
        overlay(&mut self.version, other.version, AppConfig::default().version);

        self.ingest.merge(other.ingest);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.ingest.queue_capacity == 0 {
            return Err(eyre!("queue_capacity must be greater than 0"));
        }
        if self.ingest.tick_interval_ms == 0 {
            return Err(eyre!("tick_interval_ms must be greater than 0"));
        }
        if self.ingest.max_lines_per_tick == 0 {
            return Err(eyre!("max_lines_per_tick must be greater than 0"));
        }
        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }
        if self.display.aggregate_buckets == 0 || self.display.panel_buckets == 0 {
            return Err(eyre!("bucket counts must be greater than 0"));
        }
        if !(1..=MAX_PANEL_BAR_HEIGHT).contains(&self.display.panel_bar_height) {
            return Err(eyre!(
                "panel_bar_height must be between 1 and {}",
                MAX_PANEL_BAR_HEIGHT
            ));
        }
        if self.display.panel_width == 0 {
            return Err(eyre!("panel_width must be greater than 0"));
        }

        if !COLOR_MODES.contains(&self.theme.color_mode.as_str()) {
            return Err(eyre!(
                "color_mode '{}' is not one of {}",
                self.theme.color_mode,
                COLOR_MODES.join(", ")
            ));
        }

        self.theme.colors.validate(&ColorParser::new())?;

        Ok(())
    }
}

/// Take `value` from the user file only when it differs from the built-in default.
fn overlay<T: PartialEq>(slot: &mut T, value: T, default: T) {
    if value != default {
        *slot = value;
    }
}

impl IngestConfig {
    pub fn merge(&mut self, other: Self) {
        let base = Self::default();
        overlay(&mut self.queue_capacity, other.queue_capacity, base.queue_capacity);
        overlay(&mut self.tick_interval_ms, other.tick_interval_ms, base.tick_interval_ms);
        overlay(&mut self.max_lines_per_tick, other.max_lines_per_tick, base.max_lines_per_tick);
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let base = Self::default();
        overlay(&mut self.aggregate_buckets, other.aggregate_buckets, base.aggregate_buckets);
        overlay(&mut self.panel_buckets, other.panel_buckets, base.panel_buckets);
        overlay(&mut self.panel_bar_height, other.panel_bar_height, base.panel_bar_height);
        overlay(&mut self.panel_width, other.panel_width, base.panel_width);
        overlay(&mut self.stats, other.stats, base.stats);
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        overlay(
            &mut self.event_poll_interval_ms,
            other.event_poll_interval_ms,
            Self::default().event_poll_interval_ms,
        );
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        overlay(&mut self.color_mode, other.color_mode, Self::default().color_mode);
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn entries(&self) -> [(&'static str, &String); 11] {
        [
            ("header_bg", &self.header_bg),
            ("header_fg", &self.header_fg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("controls_bg", &self.controls_bg),
            ("panel_border", &self.panel_border),
            ("active", &self.active),
            ("active_bg", &self.active_bg),
            ("pinned", &self.pinned),
            ("bar", &self.bar),
            ("empty_bucket", &self.empty_bucket),
        ]
    }

    fn entries_mut(&mut self) -> [&mut String; 11] {
        [
            &mut self.header_bg,
            &mut self.header_fg,
            &mut self.text_primary,
            &mut self.text_secondary,
            &mut self.controls_bg,
            &mut self.panel_border,
            &mut self.active,
            &mut self.active_bg,
            &mut self.pinned,
            &mut self.bar,
            &mut self.empty_bucket,
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let base = Self::default();
        let theirs = other.entries().map(|(_, v)| v.clone());
        let defaults = base.entries().map(|(_, v)| v.clone());
        for ((slot, value), default) in self.entries_mut().into_iter().zip(theirs).zip(defaults) {
            overlay(slot, value, default);
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.file.is_some() {
            self.file = other.file;
        }
        if other.level.is_some() {
            self.level = other.level;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Colours the terminal can show, detected once per parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDepth {
    /// NO_COLOR is set: every colour resolves to `Reset`.
    Disabled,
    Basic,
    Palette256,
    TrueColor,
}

const NAMED_COLORS: [(&str, Color); 20] = [
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright_black", Color::Indexed(8)),
    ("bright_red", Color::Indexed(9)),
    ("bright_green", Color::Indexed(10)),
    ("bright_yellow", Color::Indexed(11)),
    ("bright_blue", Color::Indexed(12)),
    ("bright_magenta", Color::Indexed(13)),
    ("bright_cyan", Color::Indexed(14)),
    ("bright_white", Color::Indexed(15)),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("light_gray", Color::Indexed(7)),
    ("reset", Color::Reset),
];

/// Turns colour strings from the config into terminal colours.
///
/// Accepts names (`bright_red`, `dark grey`), `indexed(N)` and `#rrggbb`;
/// hex colours are reduced to what the terminal supports.
pub struct ColorParser {
    depth: ColorDepth,
}

impl ColorParser {
    pub fn new() -> Self {
        let depth = if std::env::var_os("NO_COLOR").is_some() {
            ColorDepth::Disabled
        } else {
            match supports_color::on(Stream::Stdout) {
                Some(level) if level.has_16m => ColorDepth::TrueColor,
                Some(level) if level.has_256 => ColorDepth::Palette256,
                _ => ColorDepth::Basic,
            }
        };
        Self { depth }
    }

    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.depth == ColorDepth::Disabled {
            return Ok(Color::Reset);
        }

        let raw = s.trim();
        let wanted = raw.to_lowercase();

        if let Some(hex) = wanted.strip_prefix('#') {
            let (r, g, b) = parse_hex(hex)
                .ok_or_else(|| eyre!("Invalid hex color '{}'. Expected #rrggbb", raw))?;
            return Ok(self.fit_rgb(r, g, b));
        }

        if let Some(index) = wanted
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return index
                .trim()
                .parse::<u8>()
                .map(Color::Indexed)
                .map_err(|_| eyre!("Invalid indexed color '{}'. Expected indexed(0-255)", raw));
        }

        let name = wanted.replace(' ', "_").replace("grey", "gray");
        NAMED_COLORS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, color)| *color)
            .ok_or_else(|| {
                eyre!(
                    "Unknown color name '{}'. Use a named color (red, bright_blue, dark_gray, ...), \
                     indexed(N) or #rrggbb",
                    raw
                )
            })
    }

    fn fit_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        match self.depth {
            ColorDepth::TrueColor => Color::Rgb(r, g, b),
            ColorDepth::Palette256 => Color::Indexed(rgb_to_256_color(r, g, b)),
            ColorDepth::Basic | ColorDepth::Disabled => rgb_to_basic_ansi(r, g, b),
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `rrggbb` (without the leading `#`) to components.
fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((component(0)?, component(2)?, component(4)?))
}

/// Nearest entry of the xterm 256-colour palette: the grey ramp for
/// near-neutral colours, otherwise the 6x6x6 cube.
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    if r.max(g).max(b) - r.min(g).min(b) < 10 {
        let gray = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return match gray {
            0..=7 => 16,
            248.. => 231,
            _ => 232 + ((gray - 8) * 24 / 240) as u8,
        };
    }
    let level = |c: u8| (u16::from(c) * 5 / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Nearest of the eight basic ANSI colours.
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    if r.max(g).max(b) - r.min(g).min(b) < 30 {
        let avg = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }
    const BY_CHANNELS: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];
    let channels = usize::from(r > 128) | usize::from(g > 128) << 1 | usize::from(b > 128) << 2;
    BY_CHANNELS[channels]
}

/// Parsed theme colours, looked up by config key.
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// `Reset` for unknown names.
    pub fn get(&self, name: &str) -> Color {
        self.get_optional(name).unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
