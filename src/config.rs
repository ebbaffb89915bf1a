//! Configuration file (`~/.config/claude-limits/config.yaml`).

use crate::error::{LimitsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "CLAUDE_LIMITS_CONFIG";

pub const DEFAULT_DATETIME_FORMAT: &str = "%a, %b %-d %Y at %-I:%M %p %Z";
pub const DEFAULT_DATE_FORMAT: &str = "%a, %b %-d %Y";
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M %p";

/// Effective `strftime` patterns used when printing dates and times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPreset {
    pub datetime: String,
    pub date: String,
    pub time: String,
}

impl FormatPreset {
    fn new(datetime: &str, date: &str, time: &str) -> Self {
        Self {
            datetime: datetime.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    /// Looks up one of the named presets.
    pub fn named(name: &str) -> Option<Self> {
        let preset = match name {
            "12hour" => Self::default(),
            "24hour" => Self::new("%a, %b %-d %Y at %H:%M %Z", "%a, %b %-d %Y", "%H:%M"),
            "iso8601" => Self::new("%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%d", "%H:%M:%S"),
            "us" => Self::new("%b %-d, %Y %-I:%M %p %Z", "%b %-d, %Y", "%-I:%M %p"),
            "eu" => Self::new("%-d %b %Y %H:%M %Z", "%-d %b %Y", "%H:%M"),
            _ => return None,
        };
        Some(preset)
    }
}

impl Default for FormatPreset {
    fn default() -> Self {
        Self::new(DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub org_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    pub preset: String,
    pub datetime: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub formats: FormatsConfig,
}

impl Config {
    /// Default formats, then the named preset, then individual overrides.
    pub fn resolved_formats(&self) -> FormatPreset {
        let mut result = FormatPreset::default();

        if !self.formats.preset.is_empty() {
            match FormatPreset::named(&self.formats.preset) {
                Some(preset) => result = preset,
                None => warn!("Unknown format preset '{}'", self.formats.preset),
            }
        }

        if !self.formats.datetime.is_empty() {
            result.datetime = self.formats.datetime.clone();
        }
        if !self.formats.date.is_empty() {
            result.date = self.formats.date.clone();
        }
        if !self.formats.time.is_empty() {
            result.time = self.formats.time.clone();
        }

        result
    }

    /// Loads the config from `path`, `$CLAUDE_LIMITS_CONFIG`, or the
    /// default location, in that order. A missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = resolve_path(path) else {
            return Ok(Self::default());
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&content).map_err(|source| LimitsError::Config { path, source })
    }

    /// Like [`Config::load`], but falls back to defaults on any error.
    pub fn load_or_default(path: Option<&str>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Ignoring config: {}", e);
            Self::default()
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Platform config location: `$XDG_CONFIG_HOME` or `~/.config` on Linux,
/// `~/Library/Application Support` on macOS, `%APPDATA%` on Windows.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("claude-limits").join("config.yaml"))
}

fn resolve_path(explicit: Option<&str>) -> Option<PathBuf> {
    let env = std::env::var(CONFIG_ENV).ok();
    explicit
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or(env.filter(|p| !p.is_empty()))
        .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
        .or_else(default_config_path)
}
