use formvis::config::{AppConfig, ColorParser, Theme};
use ratatui::style::Color;
use std::fs;

mod common;
use common::setup_test_config_dir;

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.display.default_form, "reservations");
    assert_eq!(config.display.radio_columns, 4);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.directory.is_none());
    assert_eq!(config.theme.colors.primary, "cyan");
    assert_eq!(config.theme.colors.controls_bg, "indexed(236)");
    assert!(!config.debug.enabled);
    assert!(config.forms.is_empty());

    config.validate().unwrap();
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[logging]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));

    // The shipped template parses and matches the compiled-in defaults
    let parsed: AppConfig = toml::from_str(&template).unwrap();
    assert_eq!(parsed.version, AppConfig::default().version);
    assert_eq!(parsed.display.default_form, "reservations");
    parsed.validate().unwrap();
}

#[test]
fn test_write_default_config_respects_force() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager.write_default_config(false).unwrap();
    assert!(path.exists());
    assert!(config_manager.write_default_config(false).is_err());

    fs::write(&path, "version = \"0.1\"\n").unwrap();
    config_manager.write_default_config(true).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("[theme.colors]"));
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.display.default_form, "reservations");
}

#[test]
fn test_partial_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r##"
[display]
default_form = "report"

[theme.colors]
primary = "#ff8800"
"##,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.display.default_form, "report");
    assert_eq!(config.display.radio_columns, 4);
    assert_eq!(config.theme.colors.primary, "#ff8800");
    assert_eq!(config.theme.colors.border, "dark_gray");
}

#[test]
fn test_custom_forms_are_loaded_and_checked() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
[[forms]]
name = "bookings"
title = "Bookings"

[[forms.groups]]
name = "searchBy"
sections = [
    { field = "user", label = "Customer" },
    { field = "phone", label = "Phone" },
]
modes = [
    { name = "user", visible = [0] },
    { name = "phone", visible = [1] },
]
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.forms.len(), 1);
    assert_eq!(config.forms[0].name, "bookings");
    assert_eq!(config.forms[0].groups[0].modes[1].visible, vec![1]);
}

#[test]
fn test_invalid_custom_form_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
[[forms]]
name = "broken"

[[forms.groups]]
name = "searchBy"
sections = [{ field = "user", label = "Customer" }]
modes = [{ name = "phone", visible = [3] }]
"#,
    )
    .unwrap();

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn test_field_colliding_with_group_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
[[forms]]
name = "bookings"

[[forms.groups]]
name = "searchBy"
sections = [
    { field = "searchBy", label = "Customer" },
    { field = "phone", label = "Phone" },
]
modes = [
    { name = "user", visible = [0] },
    { name = "phone", visible = [1] },
]
"#,
    )
    .unwrap();

    let err = format!("{:#}", AppConfig::load_from(&config_manager).unwrap_err());
    assert!(err.contains("bookings"));
    assert!(err.contains("searchBy"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    let path = config_manager.config_path("config.toml");

    fs::write(&path, "version = \"9.0\"\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[display]\nradio_columns = 0\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[theme.colors]\nprimary = \"not-a-color\"\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[display\nbroken").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());
}

#[test]
fn test_non_ascii_hex_color_is_an_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[theme.colors]\nprimary = \"#0\u{e9}000\"\n",
    )
    .unwrap();

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("primary"));

    let parser = ColorParser::new();
    assert!(parser.parse("#\u{e9}\u{e9}\u{e9}").is_err());
    assert!(parser.parse("indexed(\u{e9})").is_err());
}

#[test]
fn test_color_parser_formats() {
    std::env::remove_var("NO_COLOR");
    let parser = ColorParser::new();

    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("Dark Grey").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert!(parser.parse("#ff0000").is_ok());
    assert!(parser.parse("indexed(300)").is_err());
    assert!(parser.parse("#ff00").is_err());
    assert!(parser.parse("chartreuse-ish").is_err());
}

#[test]
fn test_theme_from_config() {
    std::env::remove_var("NO_COLOR");
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();
    assert_eq!(theme.get("primary"), Color::Cyan);
    assert_eq!(theme.get("active"), Color::Yellow);
    assert_eq!(theme.get("no_such_color"), Color::Reset);
}
