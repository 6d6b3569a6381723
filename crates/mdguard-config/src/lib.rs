//! Configuration management for mdguard.
//!
//! Parses `mdguard.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `images.base_url`
//! - `images.missing_message`
//! - `videos.folder_url`
//! - `site_url.base_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the site URL for `siteurl` links.
    pub site_url: Option<String>,
    /// Override the base URL for images.
    pub image_base_url: Option<String>,
    /// Override the folder URL for videos.
    pub video_folder_url: Option<String>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdguard.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown conversion options.
    pub render: RenderConfig,
    /// `{image: ...}` command.
    pub images: ImagesConfig,
    /// `{video: ...}` command.
    pub videos: VideosConfig,
    /// `siteurl` links.
    pub site_url: SiteUrlConfig,
    /// Raw HTML blocks.
    pub html: HtmlConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown conversion options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Add slug ids to headings.
    pub heading_ids: bool,
    /// Append a permalink anchor to headings with an id.
    pub permalinks: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            heading_ids: true,
            permalinks: false,
        }
    }
}

/// Image command configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Whether `{image: ...}` is processed.
    pub enabled: bool,
    /// URL relative image sources resolve against.
    pub base_url: String,
    /// Text rendered for an image command without file.
    pub missing_message: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "/".to_owned(),
            missing_message: "No image file specified".to_owned(),
        }
    }
}

/// Video command configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VideosConfig {
    /// Whether `{video: ...}` is processed.
    pub enabled: bool,
    /// URL relative video files resolve against. Empty means `/`.
    pub folder_url: String,
}

impl Default for VideosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            folder_url: "/".to_owned(),
        }
    }
}

/// Site link configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteUrlConfig {
    /// Whether `siteurl` links are rewritten.
    pub enabled: bool,
    /// Site URL the links resolve against.
    pub base_url: String,
}

impl Default for SiteUrlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "/".to_owned(),
        }
    }
}

/// Raw HTML block configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Whether raw HTML blocks are extracted.
    pub enabled: bool,
    /// Delimiter around raw HTML blocks.
    pub delimiter: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delimiter: "{html}".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site_url.base_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdguard.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(site_url) = &settings.site_url {
            self.site_url.base_url.clone_from(site_url);
        }
        if let Some(base_url) = &settings.image_base_url {
            self.images.base_url.clone_from(base_url);
        }
        if let Some(folder_url) = &settings.video_folder_url {
            self.videos.folder_url.clone_from(folder_url);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.html.enabled {
            require_non_empty(&self.html.delimiter, "html.delimiter")?;
            if self.html.delimiter.trim() != self.html.delimiter {
                return Err(ConfigError::Validation(
                    "html.delimiter cannot start or end with whitespace".to_owned(),
                ));
            }
        }
        if self.site_url.enabled {
            require_non_empty(&self.site_url.base_url, "site_url.base_url")?;
        }
        if self.images.enabled {
            require_non_empty(&self.images.base_url, "images.base_url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.images.base_url = expand::expand_env(&self.images.base_url, "images.base_url")?;
        self.images.missing_message =
            expand::expand_env(&self.images.missing_message, "images.missing_message")?;
        self.videos.folder_url = expand::expand_env(&self.videos.folder_url, "videos.folder_url")?;
        self.site_url.base_url = expand::expand_env(&self.site_url.base_url, "site_url.base_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.render.gfm);
        assert!(config.render.heading_ids);
        assert!(!config.render.permalinks);
        assert!(config.images.enabled);
        assert_eq!(config.images.base_url, "/");
        assert_eq!(config.images.missing_message, "No image file specified");
        assert_eq!(config.videos.folder_url, "/");
        assert_eq!(config.site_url.base_url, "/");
        assert_eq!(config.html.delimiter, "{html}");
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.html.enabled);
        assert_eq!(config.site_url.base_url, "/");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[render]
gfm = false
heading_ids = false
permalinks = true

[images]
enabled = true
base_url = "https://cdn.example.com/img"
missing_message = "Kein Bild"

[videos]
enabled = false
folder_url = "/media"

[site_url]
base_url = "https://docs.example.com"

[html]
delimiter = "{raw}"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.render.gfm);
        assert!(!config.render.heading_ids);
        assert!(config.render.permalinks);
        assert_eq!(config.images.base_url, "https://cdn.example.com/img");
        assert_eq!(config.images.missing_message, "Kein Bild");
        assert!(!config.videos.enabled);
        assert_eq!(config.videos.folder_url, "/media");
        assert!(config.site_url.enabled);
        assert_eq!(config.site_url.base_url, "https://docs.example.com");
        assert_eq!(config.html.delimiter, "{raw}");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("[images\nbase_url = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_delimiter() {
        let mut config = Config::default();
        config.html.delimiter = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("html.delimiter"));
    }

    #[test]
    fn test_validate_padded_delimiter() {
        let mut config = Config::default();
        config.html.delimiter = " {html}".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_disabled_section_skipped() {
        let mut config = Config::default();
        config.html.enabled = false;
        config.html.delimiter = String::new();
        config.site_url.enabled = false;
        config.site_url.base_url = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_video_folder_allowed() {
        // An empty folder resolves videos against the site root.
        let mut config = Config::default();
        config.videos.folder_url = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_site_url() {
        let mut config = Config::default();
        config.site_url.base_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site_url.base_url"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            site_url: Some("https://example.com".to_owned()),
            video_folder_url: Some("/videos".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.site_url.base_url, "https://example.com");
        assert_eq!(config.videos.folder_url, "/videos");
        assert_eq!(config.images.base_url, "/"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.site_url.base_url, "/");
        assert_eq!(config.images.base_url, "/");
        assert_eq!(config.videos.folder_url, "/");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[site_url]\nbase_url = \"https://a.example\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.site_url.base_url, "https://a.example");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[images]\nbase_url = \"/from-file\"\n").unwrap();

        let overrides = CliSettings {
            image_base_url: Some("/from-cli".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.images.base_url, "/from-cli");
    }

    #[test]
    fn test_load_cli_settings_validated() {
        let overrides = CliSettings {
            site_url: Some(String::new()),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_expands_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDGUARD_TEST_CONFIG_SITE", "https://env.example.com");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[site_url]\nbase_url = \"${MDGUARD_TEST_CONFIG_SITE}/docs\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.site_url.base_url, "https://env.example.com/docs");
        unsafe {
            std::env::remove_var("MDGUARD_TEST_CONFIG_SITE");
        }
    }

    #[test]
    fn test_load_missing_env_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDGUARD_TEST_CONFIG_MISSING");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[videos]\nfolder_url = \"${MDGUARD_TEST_CONFIG_MISSING}\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("guide");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config(&nested).unwrap();
        assert_eq!(found, nested.join(CONFIG_FILENAME));
    }
}
