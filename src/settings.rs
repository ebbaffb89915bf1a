//! Claude Code `settings.json` editing.
//!
//! Only the `statusLine` key is touched; every other field is written back
//! as it was read.

use crate::error::{LimitsError, Result};
use serde_json::{json, Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const STATUS_LINE_KEY: &str = "statusLine";

/// Which settings file to edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    User,
    Project,
}

impl SettingsScope {
    /// `~/.claude/settings.json` or `.claude/settings.json`
    pub fn default_path(self) -> Result<PathBuf> {
        match self {
            SettingsScope::User => dirs::home_dir()
                .map(|home| home.join(".claude").join("settings.json"))
                .ok_or_else(|| {
                    LimitsError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "could not determine home directory",
                    ))
                }),
            SettingsScope::Project => Ok(Path::new(".claude").join("settings.json")),
        }
    }
}

impl fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsScope::User => write!(f, "user"),
            SettingsScope::Project => write!(f, "project"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    fields: Map<String, Value>,
}

impl Settings {
    /// Reads settings from `path`; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let fields: Map<String, Value> = serde_json::from_str(&content)?;
        Ok(Self { fields })
    }

    pub fn has_status_line(&self) -> bool {
        self.fields.contains_key(STATUS_LINE_KEY)
    }

    pub fn status_line(&self) -> Option<&Value> {
        self.fields.get(STATUS_LINE_KEY)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Points the status line at `command`. Refuses to replace an existing
    /// entry unless `force` is set.
    pub fn set_status_line(&mut self, command: &str, force: bool, scope: SettingsScope, path: &Path) -> Result<()> {
        if self.has_status_line() && !force {
            return Err(LimitsError::StatusLineExists {
                scope: scope.to_string(),
                path: path.to_path_buf(),
            });
        }

        self.fields.insert(
            STATUS_LINE_KEY.to_string(),
            json!({ "type": "command", "command": command }),
        );
        Ok(())
    }

    /// Writes pretty JSON with a trailing newline, creating parent dirs.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut data = serde_json::to_string_pretty(&self.fields)?;
        data.push('\n');
        fs::write(path, data)?;
        Ok(())
    }
}
