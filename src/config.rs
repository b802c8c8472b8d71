//! Configuration file parser for ~/.config/newsdesk/config.toml.
//!
//! The file is optional; a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are most likely typos.
use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::menu::{MenuSerialization, DEFAULT_MENU_NAME};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every key is optional. `api_token` is masked in Debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the CMS API; endpoint paths are joined onto it.
    pub api_base_url: String,

    /// Bearer token. `NEWSDESK_API_TOKEN` takes precedence over this.
    pub api_token: Option<String>,

    /// Menu name sent with every menu save.
    pub menu_name: String,

    /// Tree shape written by menu saves.
    pub menu_serialization: MenuSerialization,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Ask before deleting a menu item and its subtree.
    pub confirm_menu_delete: bool,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            menu_name: DEFAULT_MENU_NAME.to_string(),
            menu_serialization: MenuSerialization::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            theme: "dark".to_string(),
            confirm_menu_delete: true,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("menu_name", &self.menu_name)
            .field("menu_serialization", &self.menu_serialization)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("theme", &self.theme)
            .field("confirm_menu_delete", &self.confirm_menu_delete)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 8] = [
    "api_base_url",
    "api_token",
    "menu_name",
    "menu_serialization",
    "request_timeout_secs",
    "theme",
    "confirm_menu_delete",
    "keybindings",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Oversized file → `Err(ConfigError::TooLarge)`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text. Blank input yields the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            api_base_url = %config.api_base_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8000/api/");
        assert_eq!(config.menu_name, "main_navigation");
        assert_eq!(config.menu_serialization, MenuSerialization::Full);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.theme, "dark");
        assert!(config.confirm_menu_delete);
        assert!(config.api_token.is_none());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsdesk_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "  \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.menu_name, "main_navigation");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("theme = \"light\"\n").unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.confirm_menu_delete);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "https://cms.example.com/api/"
api_token = "token-123"
menu_name = "footer_navigation"
menu_serialization = "clean"
request_timeout_secs = 10
theme = "light"
confirm_menu_delete = false

[keybindings]
quit = "Ctrl+q"
save = "F2"
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.api_base_url, "https://cms.example.com/api/");
        assert_eq!(config.api_token.as_deref(), Some("token-123"));
        assert_eq!(config.menu_name, "footer_navigation");
        assert_eq!(config.menu_serialization, MenuSerialization::Clean);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(!config.confirm_menu_delete);
        assert_eq!(config.keybindings.get("save").map(String::as_str), Some("F2"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Config::parse("theme = [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_serialization_mode_is_parse_error() {
        let result = Config::parse("menu_serialization = \"compact\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::parse("them = \"light\"\nrefresh = 5\n").unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let padding = "#".repeat(Config::MAX_FILE_SIZE as usize + 1);
        std::fs::write(&path, padding).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::TooLarge(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            api_token: Some("super-secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
