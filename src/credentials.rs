//! Claude Code OAuth credentials.

use crate::error::{LimitsError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub subscription_type: Option<String>,
    pub rate_limit_tier: Option<String>,
}

impl Credentials {
    /// True when the token carries an expiry and it has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Utc::now() > at)
    }

    pub fn subscription(&self) -> &str {
        self.subscription_type.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<OAuthSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthSection {
    #[serde(default)]
    access_token: String,
    refresh_token: Option<String>,
    /// Milliseconds since the Unix epoch
    expires_at: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    scopes: Vec<String>,
    subscription_type: Option<String>,
    rate_limit_tier: Option<String>,
}

/// Default location of the credentials Claude Code writes after login.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join(".credentials.json"))
}

/// Loads credentials from `path`, or from the default locations when `None`.
///
/// On macOS the login Keychain is tried before the credentials file.
pub fn load(path: Option<&Path>) -> Result<Credentials> {
    if let Some(path) = path {
        return load_file(path);
    }

    #[cfg(target_os = "macos")]
    {
        match keychain_credentials() {
            Ok(creds) => return Ok(creds),
            Err(e) => debug!("Keychain credentials unavailable: {}", e),
        }
    }

    let path = default_credentials_path()
        .ok_or_else(|| LimitsError::Credentials("could not determine home directory".into()))?;
    load_file(&path)
}

fn load_file(path: &Path) -> Result<Credentials> {
    debug!("Reading credentials from {}", path.display());
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LimitsError::CredentialsNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(LimitsError::Credentials(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    parse_credentials_json(&content)
}

#[cfg(target_os = "macos")]
fn keychain_credentials() -> Result<Credentials> {
    use std::process::Command;

    let output = Command::new("security")
        .args(["find-generic-password", "-s", "Claude Code-credentials", "-w"])
        .output()?;

    if !output.status.success() {
        return Err(LimitsError::Credentials("Keychain item not found".into()));
    }

    let json = String::from_utf8(output.stdout)
        .map_err(|e| LimitsError::Credentials(format!("invalid UTF-8 in Keychain data: {e}")))?;
    parse_credentials_json(&json)
}

fn parse_credentials_json(json: &str) -> Result<Credentials> {
    let file: CredentialsFile = serde_json::from_str(json.trim())
        .map_err(|e| LimitsError::Credentials(format!("failed to parse credentials: {e}")))?;

    let oauth = file
        .claude_ai_oauth
        .filter(|oauth| !oauth.access_token.is_empty())
        .ok_or_else(|| {
            LimitsError::Credentials("no OAuth access token found in credentials".into())
        })?;

    Ok(Credentials {
        access_token: oauth.access_token,
        refresh_token: oauth.refresh_token,
        expires_at: oauth
            .expires_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        subscription_type: oauth.subscription_type,
        rate_limit_tier: oauth.rate_limit_tier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_credentials_json() {
        let json = r#"{
            "claudeAiOauth": {
                "accessToken": "test-token-123",
                "refreshToken": "refresh-456",
                "expiresAt": 1234567890000,
                "scopes": ["user:inference"],
                "subscriptionType": "max",
                "rateLimitTier": "default_claude_max_5x"
            }
        }"#;

        let creds = parse_credentials_json(json).unwrap();
        assert_eq!(creds.access_token, "test-token-123");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh-456"));
        assert_eq!(creds.subscription(), "max");
        assert_eq!(creds.expires_at.unwrap().timestamp(), 1234567890);
        assert!(creds.is_expired());
    }

    #[test]
    fn test_parse_credentials_json_missing_oauth() {
        assert!(matches!(
            parse_credentials_json("{}"),
            Err(LimitsError::Credentials(_))
        ));
    }

    #[test]
    fn test_parse_credentials_json_empty_token() {
        let json = r#"{"claudeAiOauth": {"accessToken": ""}}"#;
        assert!(matches!(
            parse_credentials_json(json),
            Err(LimitsError::Credentials(_))
        ));
    }

    #[test]
    fn test_token_without_expiry_is_not_expired() {
        let json = r#"{"claudeAiOauth": {"accessToken": "abc"}}"#;
        let creds = parse_credentials_json(json).unwrap();
        assert!(!creds.is_expired());
        assert_eq!(creds.subscription(), "unknown");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".credentials.json");
        match load(Some(&path)) {
            Err(LimitsError::CredentialsNotFound { path: p }) => assert_eq!(p, path),
            other => panic!("Expected CredentialsNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".credentials.json");
        let expires = Utc::now().timestamp_millis() + 3_600_000;
        fs::write(
            &path,
            format!(r#"{{"claudeAiOauth": {{"accessToken": "tok", "expiresAt": {expires}}}}}"#),
        )
        .unwrap();

        let creds = load(Some(&path)).unwrap();
        assert_eq!(creds.access_token, "tok");
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_default_credentials_path() {
        if let Some(path) = default_credentials_path() {
            assert!(path.ends_with(".claude/.credentials.json"));
        }
    }
}
