use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigManager;
use crate::error::{MirrorError, Result};

/// Environment variable that overrides the settings file location.
pub const SETTINGS_PATH_ENV: &str = "JOURNAL_MIRROR_CONFIG";

/// Inclusive bounds for the download worker count.
pub const MIN_THREAD_COUNT: usize = 1;
pub const MAX_THREAD_COUNT: usize = 8;

fn default_thread_count() -> usize {
    4
}

/// Connection and mirror settings for the journal service
///
/// Loaded once at process start and passed by reference into every
/// collaborator; nothing reads configuration ambiently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the journal service API (absolute http/https URL)
    pub api_base_url: String,

    /// Name of the authorization header attached to every request
    pub auth_header_key: String,

    /// Value of the authorization header (opaque token, externally issued)
    pub auth_header_value: String,

    /// Number of concurrent download workers, between 1 and 8 inclusive
    #[serde(default = "default_thread_count")]
    pub max_thread_count: usize,

    /// Top-level directory the journal content is mirrored into
    pub mirror_root: PathBuf,
}

impl Settings {
    /// Load settings from `path`, the `JOURNAL_MIRROR_CONFIG` override, or
    /// the default settings file, and validate them.
    ///
    /// # Errors
    /// Returns `MirrorError::Config` if the file is missing, unreadable,
    /// malformed, or fails validation. This happens before any network call.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !settings_path.exists() {
            return Err(MirrorError::config(format!(
                "settings file not found: {}. Run 'journal-mirror init' first.",
                settings_path.display()
            )));
        }

        let content = fs::read_to_string(&settings_path).map_err(|e| {
            MirrorError::config(format!(
                "failed to read {}: {e}",
                settings_path.display()
            ))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            MirrorError::config(format!(
                "failed to parse {}: {e}",
                settings_path.display()
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to `path` or the default settings file.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        self.validate()?;

        let settings_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if let Some(parent) = settings_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MirrorError::config(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MirrorError::config(format!("failed to serialize settings: {e}")))?;

        fs::write(&settings_path, content).map_err(|e| {
            MirrorError::config(format!(
                "failed to write {}: {e}",
                settings_path.display()
            ))
        })?;

        Ok(())
    }

    /// Check every field against the constraints the rest of the system
    /// relies on. Invalid settings fail here, fast, never mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(MirrorError::config("api_base_url must not be empty"));
        }

        let parsed = url::Url::parse(&self.api_base_url)
            .map_err(|e| MirrorError::config(format!("api_base_url is not a valid URL: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(MirrorError::config(format!(
                "api_base_url must be an http(s) URL, got scheme '{}'",
                parsed.scheme()
            )));
        }

        if self.auth_header_key.trim().is_empty() {
            return Err(MirrorError::config("auth_header_key must not be empty"));
        }
        if self.auth_header_value.trim().is_empty() {
            return Err(MirrorError::config("auth_header_value must not be empty"));
        }

        if !(MIN_THREAD_COUNT..=MAX_THREAD_COUNT).contains(&self.max_thread_count) {
            return Err(MirrorError::config(format!(
                "max_thread_count must be between {MIN_THREAD_COUNT} and {MAX_THREAD_COUNT}, got {}",
                self.max_thread_count
            )));
        }

        if self.mirror_root.as_os_str().is_empty() {
            return Err(MirrorError::config("mirror_root must not be empty"));
        }

        Ok(())
    }

    /// Print the current settings to the console, token redacted.
    pub fn show(&self) {
        println!("{}", "Current Settings:".bold());
        println!("  {}: {}", "API base URL".cyan(), self.api_base_url);
        println!("  {}: {}", "Auth header".cyan(), self.auth_header_key);
        println!(
            "  {}: {} characters (redacted)",
            "Auth value".cyan(),
            self.auth_header_value.len()
        );
        println!("  {}: {}", "Download workers".cyan(), self.max_thread_count);
        println!(
            "  {}: {}",
            "Mirror root".cyan(),
            self.mirror_root.display()
        );
    }

    fn default_path() -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var(SETTINGS_PATH_ENV) {
            return Ok(PathBuf::from(env_path));
        }
        ConfigManager::settings_path()
            .map_err(|e| MirrorError::config(format!("failed to locate settings file: {e}")))
    }
}
