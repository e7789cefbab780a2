//! Configuration management
//!
//! Settings live in `<data_dir>/settings.json`:
//! ```json
//! {
//!   "server": { "bind": "127.0.0.1:8000", "sessionTtlHours": 336 },
//!   "flaws": { "brokenAccessControl": true, "sqlInjection": true },
//!   "uploads": { "maxAvatarBytes": 2097152 }
//! }
//! ```
//! Keys this crate does not know about are preserved on save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
/// Two weeks, the usual cookie-session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DB_FILENAME: &str = "cyberblog.duckdb";
pub const MEDIA_DIRNAME: &str = "media";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    server: ServerSettings,
    #[serde(default)]
    flaws: FlawSettings,
    #[serde(default)]
    uploads: UploadSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_ttl_hours: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlawSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    broken_access_control: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sql_injection: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_avatar_bytes: Option<usize>,
}

/// Which intentional vulnerabilities are switched on.
///
/// Both default to on: the application exists to be attacked. Turning a
/// switch off selects the corrected code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlawSwitches {
    /// Profile page trusts the `user_id` query parameter
    pub broken_access_control: bool,
    /// Lookup endpoint interpolates `id` into SQL
    pub sql_injection: bool,
}

impl FlawSwitches {
    pub fn all_enabled() -> Self {
        Self {
            broken_access_control: true,
            sql_injection: true,
        }
    }

    pub fn all_patched() -> Self {
        Self {
            broken_access_control: false,
            sql_injection: false,
        }
    }
}

impl Default for FlawSwitches {
    fn default() -> Self {
        Self::all_enabled()
    }
}

/// Application configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind: String,
    pub session_ttl_hours: i64,
    pub max_avatar_bytes: usize,
    pub flaws: FlawSwitches,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Defaults rooted at `data_dir`, ignoring settings.json and the environment
    pub fn with_defaults(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            bind: DEFAULT_BIND.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
            flaws: FlawSwitches::default(),
            _raw_settings: SettingsFile::default(),
        }
    }

    /// Load config from the data directory
    ///
    /// Environment variables override the file (handy for CI and classroom demos):
    /// `CYBERBLOG_BIND`, `CYBERBLOG_BROKEN_ACCESS_CONTROL`, `CYBERBLOG_SQL_INJECTION`.
    /// A settings.json that does not parse is an error, never a silent reset.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(data_dir)?;

        if let Ok(bind) = std::env::var("CYBERBLOG_BIND") {
            if !bind.trim().is_empty() {
                config.bind = bind.trim().to_string();
            }
        }
        if let Some(on) = env_flag("CYBERBLOG_BROKEN_ACCESS_CONTROL") {
            config.flaws.broken_access_control = on;
        }
        if let Some(on) = env_flag("CYBERBLOG_SQL_INJECTION") {
            config.flaws.sql_injection = on;
        }

        Ok(config)
    }

    /// Load settings.json alone, without environment overrides.
    ///
    /// Use this for anything that is saved back, so a shell override is not
    /// written into the file.
    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILENAME))?.unwrap_or_default();
        Ok(Self::from_settings(data_dir, raw))
    }

    fn from_settings(data_dir: &Path, raw: SettingsFile) -> Self {
        let defaults = FlawSwitches::default();
        Self {
            data_dir: data_dir.to_path_buf(),
            bind: raw
                .server
                .bind
                .clone()
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            session_ttl_hours: raw
                .server
                .session_ttl_hours
                .filter(|h| *h > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            max_avatar_bytes: raw
                .uploads
                .max_avatar_bytes
                .filter(|b| *b > 0)
                .unwrap_or(DEFAULT_MAX_AVATAR_BYTES),
            flaws: FlawSwitches {
                broken_access_control: raw
                    .flaws
                    .broken_access_control
                    .unwrap_or(defaults.broken_access_control),
                sql_injection: raw.flaws.sql_injection.unwrap_or(defaults.sql_injection),
            },
            _raw_settings: raw,
        }
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self) -> Result<()> {
        let settings_path = self.data_dir.join(SETTINGS_FILENAME);

        // Refuses to overwrite a file that does not parse
        let mut settings =
            read_settings(&settings_path)?.unwrap_or_else(|| self._raw_settings.clone());

        settings.server.bind = Some(self.bind.clone());
        settings.server.session_ttl_hours = Some(self.session_ttl_hours);
        settings.uploads.max_avatar_bytes = Some(self.max_avatar_bytes);
        settings.flaws.broken_access_control = Some(self.flaws.broken_access_control);
        settings.flaws.sql_injection = Some(self.flaws.sql_injection);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILENAME)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join(MEDIA_DIRNAME)
    }
}

/// Parsed settings.json, or `None` when the file does not exist
fn read_settings(path: &Path) -> Result<Option<SettingsFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let raw = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(Some(raw))
}

/// Parse a boolean environment variable; unknown values are ignored
fn env_flag(name: &str) -> Option<bool> {
    parse_flag(std::env::var(name).ok().as_deref())
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true" | "1" | "yes" | "on" | "TRUE" | "YES" | "ON") => Some(true),
        Some("false" | "0" | "no" | "off" | "FALSE" | "NO" | "OFF") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_enable_every_flaw() {
        let config = Config::with_defaults(Path::new("/tmp/x"));
        assert_eq!(config.flaws, FlawSwitches::all_enabled());
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.db_path(), Path::new("/tmp/x").join(DB_FILENAME));
    }

    #[test]
    fn test_settings_file_values() {
        let raw: SettingsFile = serde_json::from_str(
            r#"{
                "server": { "bind": "0.0.0.0:9000", "sessionTtlHours": 1 },
                "flaws": { "sqlInjection": false },
                "uploads": { "maxAvatarBytes": 1000 }
            }"#,
        )
        .unwrap();
        let config = Config::from_settings(Path::new("/data"), raw);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.session_ttl_hours, 1);
        assert_eq!(config.max_avatar_bytes, 1000);
        assert!(config.flaws.broken_access_control);
        assert!(!config.flaws.sql_injection);
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let raw: SettingsFile = serde_json::from_str(
            r#"{ "server": { "sessionTtlHours": 0 }, "uploads": { "maxAvatarBytes": 0 } }"#,
        )
        .unwrap();
        let config = Config::from_settings(Path::new("/data"), raw);
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(config.max_avatar_bytes, DEFAULT_MAX_AVATAR_BYTES);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(Some("yes")), Some(true));
        assert_eq!(parse_flag(Some("OFF")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");
        std::fs::write(
            &settings_path,
            r#"{ "course": { "week": 3 }, "flaws": { "brokenAccessControl": true } }"#,
        )
        .unwrap();

        let raw: SettingsFile =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        let mut config = Config::from_settings(temp_dir.path(), raw);
        config.flaws = FlawSwitches::all_patched();
        config.save().unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(saved["course"]["week"], 3);
        assert_eq!(saved["flaws"]["brokenAccessControl"], false);
        assert_eq!(saved["flaws"]["sqlInjection"], false);
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join(SETTINGS_FILENAME);
        let malformed = r#"{ "course": { "week": 3 }, "flaws": { "sqlInjection": false }, }"#;
        std::fs::write(&settings_path, malformed).unwrap();

        let err = Config::load_file(temp_dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
        assert!(Config::load(temp_dir.path()).is_err());

        let mut config = Config::with_defaults(temp_dir.path());
        config.flaws = FlawSwitches::all_patched();
        assert!(config.save().is_err());
        assert_eq!(std::fs::read_to_string(&settings_path).unwrap(), malformed);
    }

    #[test]
    fn test_load_file_ignores_environment() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILENAME),
            r#"{ "flaws": { "sqlInjection": true } }"#,
        )
        .unwrap();

        std::env::set_var("CYBERBLOG_SQL_INJECTION", "0");
        let from_file = Config::load_file(temp_dir.path());
        let resolved = Config::load(temp_dir.path());
        std::env::remove_var("CYBERBLOG_SQL_INJECTION");

        assert!(from_file.unwrap().flaws.sql_injection);
        assert!(!resolved.unwrap().flaws.sql_injection);
    }
}
