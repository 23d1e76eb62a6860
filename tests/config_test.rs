use facetscope::config::{AppConfig, ColorConfig, ConfigManager, DisplayConfig, Theme};
use ratatui::style::Color;
use std::fs;
use tempfile::TempDir;

/// Manager rooted in a fresh directory that does not exist yet.
fn scratch_manager() -> (TempDir, ConfigManager) {
    let root = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(root.path().join("facetscope"));
    (root, manager)
}

fn write_user_config(manager: &ConfigManager, body: &str) {
    manager.ensure_config_dir().unwrap();
    fs::write(manager.config_path("config.toml"), body).unwrap();
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.ingest.queue_capacity, 100);
    assert_eq!(config.ingest.tick_interval_ms, 500);
    assert_eq!(config.display.aggregate_buckets, 20);
    assert_eq!(config.display.panel_buckets, 10);
    assert_eq!(config.display.panel_bar_height, 10);
    assert_eq!(config.display.panel_width, 60);
    assert!(!config.display.stats);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.logging.file, None);
    assert!(!config.debug.enabled);
}

#[test]
fn test_write_default_config_creates_directory() {
    let (_root, manager) = scratch_manager();
    assert!(!manager.config_dir().exists());

    let written = manager.write_default_config(false).unwrap();
    assert!(written.exists());
    let content = fs::read_to_string(&written).unwrap();
    assert!(content.contains("[ingest]"));
    assert!(content.contains("[theme.colors]"));
    assert!(content.contains("version = \"0.1\""));
}

#[test]
fn test_existing_config_needs_force() {
    let (_root, manager) = scratch_manager();
    manager.write_default_config(false).unwrap();

    let err = manager.write_default_config(false).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(manager.write_default_config(true).is_ok());
}

#[test]
fn test_load_file_missing_gives_defaults() {
    let (_root, manager) = scratch_manager();
    let config = manager.load_file().expect("defaults");
    assert_eq!(config.ingest.queue_capacity, 100);
}

#[test]
fn test_load_file_partial_config_layers_over_defaults() {
    let (_root, manager) = scratch_manager();
    write_user_config(
        &manager,
        r#"
version = "0.1"

[ingest]
queue_capacity = 500

[display]
stats = true
"#,
    );

    let mut config = AppConfig::default();
    config.merge(manager.load_file().expect("parse"));

    assert_eq!(config.ingest.queue_capacity, 500);
    assert!(config.display.stats);
    assert_eq!(config.ingest.tick_interval_ms, 500);
    assert_eq!(config.display.aggregate_buckets, 20);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_file_reports_parse_errors() {
    let (_root, manager) = scratch_manager();
    write_user_config(&manager, "[ingest\nqueue");

    let err = manager.load_file().unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_default_values_in_user_file_keep_earlier_layer() {
    let mut base = DisplayConfig {
        aggregate_buckets: 30,
        panel_width: 40,
        ..DisplayConfig::default()
    };

    base.merge(DisplayConfig::default());

    assert_eq!(base.aggregate_buckets, 30);
    assert_eq!(base.panel_width, 40);
}

#[test]
fn test_validate_rejects_bad_values() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..Default::default()
    };
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));

    let mut config = AppConfig::default();
    config.ingest.tick_interval_ms = 0;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("tick_interval_ms must be greater than 0"));

    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.display.panel_buckets = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.display.panel_bar_height = 1000;
    assert!(config.validate().is_ok());
    config.display.panel_bar_height = 1001;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("panel_bar_height must be between 1 and 1000"));
}

#[test]
fn test_invalid_color_fails_validation() {
    std::env::remove_var("NO_COLOR");

    let mut config = AppConfig::default();
    config.theme.colors = ColorConfig {
        pinned: "not-a-color".to_string(),
        ..ColorConfig::default()
    };
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("pinned"));
}

#[test]
fn test_theme_from_default_config() {
    std::env::remove_var("NO_COLOR");

    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();
    assert_eq!(theme.get("pinned"), Color::Indexed(205));
    assert_eq!(theme.get("active_bg"), Color::Indexed(23));
    assert_eq!(theme.get("header_bg"), Color::Blue);
    assert_eq!(theme.get("no_such_color"), Color::Reset);
    assert!(theme.get_optional("no_such_color").is_none());
}
