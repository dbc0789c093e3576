use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

use crate::forms::{FormSpec, FormState};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse `config.toml` from this directory. A missing file yields defaults.
    pub fn read_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
    /// Additional forms; a form named like a built-in one replaces it
    pub forms: Vec<FormSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub default_form: String,
    pub radio_columns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Filter directive, e.g. "info" or "formvis=debug". RUST_LOG takes precedence.
    pub level: String,
    /// Log directory; defaults to the platform cache directory
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub border: String,
    pub active: String,
    pub text: String,
    pub dimmed: String,
    pub controls_bg: String,
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
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
            forms: Vec::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_form: "reservations".to_string(),
            radio_columns: 4,
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

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            border: "dark_gray".to_string(),
            active: "yellow".to_string(),
            text: "white".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load from an explicit config directory (default → file in that directory)
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(config_manager.read_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.logging.merge(other.logging);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
        if !other.forms.is_empty() {
            self.forms = other.forms;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.display.radio_columns == 0 {
            return Err(eyre!("radio_columns must be greater than 0"));
        }

        EnvFilter::try_new(&self.logging.level)
            .map_err(|e| eyre!("Invalid logging level '{}': {}", self.logging.level, e))?;

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        let mut names = HashSet::new();
        for form in &self.forms {
            if !names.insert(form.name.as_str()) {
                return Err(eyre!("Form '{}' is defined more than once", form.name));
            }
            FormState::new(form.clone())
                .map_err(|e| eyre!("Invalid form '{}': {}", form.name, e))?;
        }

        Ok(())
    }
}

/// Take `value` unless it is the built-in default, so a file that omits a
/// key (and gets the default through `serde(default)`) never overrides it.
fn merge_field<T: PartialEq>(slot: &mut T, value: T, default: T) {
    if value != default {
        *slot = value;
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let d = Self::default();
        merge_field(&mut self.default_form, other.default_form, d.default_form);
        merge_field(&mut self.radio_columns, other.radio_columns, d.radio_columns);
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let d = Self::default();
        merge_field(
            &mut self.event_poll_interval_ms,
            other.event_poll_interval_ms,
            d.event_poll_interval_ms,
        );
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let d = Self::default();
        merge_field(&mut self.enabled, other.enabled, d.enabled);
        merge_field(&mut self.level, other.level, d.level);
        merge_field(&mut self.directory, other.directory, None);
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("primary", self.primary.as_str()),
            ("border", self.border.as_str()),
            ("active", self.active.as_str()),
            ("text", self.text.as_str()),
            ("dimmed", self.dimmed.as_str()),
            ("controls_bg", self.controls_bg.as_str()),
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
        let d = Self::default();
        merge_field(&mut self.primary, other.primary, d.primary);
        merge_field(&mut self.border, other.border, d.border);
        merge_field(&mut self.active, other.active, d.active);
        merge_field(&mut self.text, other.text, d.text);
        merge_field(&mut self.dimmed, other.dimmed, d.dimmed);
        merge_field(&mut self.controls_bg, other.controls_bg, d.controls_bg);
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        self.enabled |= other.enabled;
    }
}

/// Turns theme color strings into terminal colors. Hex colors are passed
/// through on true-color terminals and mapped onto the xterm palette elsewhere.
pub struct ColorParser {
    true_color: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        Self {
            true_color: supports_color::on(Stream::Stdout).is_some_and(|level| level.has_16m),
            no_color: std::env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Accepts a color name, `#rrggbb` or `indexed(n)`.
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();

        let color = if trimmed.starts_with('#') {
            let (r, g, b) = parse_hex(trimmed)?;
            if self.true_color {
                Color::Rgb(r, g, b)
            } else {
                Color::Indexed(rgb_to_256_color(r, g, b))
            }
        } else if let Some(index) = indexed_argument(trimmed) {
            let index = index.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            Color::Indexed(index)
        } else {
            parse_named(trimmed)?
        };

        // NO_COLOR still validates, it just renders everything in the default color
        if self.no_color {
            return Ok(Color::Reset);
        }
        Ok(color)
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The `n` of `indexed(n)`, matched case-insensitively.
fn indexed_argument(s: &str) -> Option<&str> {
    let head = s.get(..8)?;
    if !head.eq_ignore_ascii_case("indexed(") {
        return None;
    }
    s[8..].strip_suffix(')')
}

fn parse_named(name: &str) -> Result<Color> {
    match name.to_lowercase().replace(' ', "_").as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "white" => Ok(Color::White),
        "gray" | "grey" | "dark_gray" | "dark_grey" => Ok(Color::Indexed(8)),
        "light_gray" | "light_grey" => Ok(Color::Indexed(7)),
        "reset" | "default" => Ok(Color::Reset),
        _ => Err(eyre!(
            "Unknown color name: '{}'. Use a basic color name, a gray variant, \
             indexed(n) or #rrggbb",
            name
        )),
    }
}

/// `#rrggbb` to its components.
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| eyre!("Invalid hex color: '{}'. Expected format: #rrggbb", s))?;

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Ok((r, g, b)),
        _ => Err(eyre!("Invalid hex color: '{}'", s)),
    }
}

/// Nearest entry of the xterm 256-color palette: the 24-step gray ramp for
/// near-neutral colors, the 6x6x6 cube otherwise.
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let (hi, lo) = (r.max(g).max(b), r.min(g).min(b));
    if hi - lo < 10 {
        let level = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return match level {
            0..=7 => 16,
            248..=u16::MAX => 231,
            _ => 232 + ((level - 8) / 10) as u8,
        };
    }

    let step = |c: u8| (u16::from(c) * 5 / 255) as u8;
    16 + 36 * step(r) + 6 * step(g) + step(b)
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
