//! Configuration management for quizmark.
//!
//! Parses `quizmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [render]
//! hard_breaks = true
//! heading_separators = true
//! max_depth = 128
//!
//! [highlight]
//! theme = "InspiredGitHub"
//! default_language = "text"
//!
//! [copy_button]
//! feedback_duration_ms = 3000
//!
//! [math]
//! enabled = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override highlight theme.
    pub theme: Option<String>,
    /// Override syntax highlighting enabled flag.
    pub highlight_enabled: Option<bool>,
    /// Override copy button enabled flag.
    pub copy_button_enabled: Option<bool>,
    /// Override math typesetting enabled flag.
    pub math_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quizmark.toml";

/// Upper bound for `copy_button.feedback_duration_ms`.
const MAX_FEEDBACK_MS: u32 = 60_000;

/// Upper bound for `render.max_depth`.
const MAX_DEPTH_LIMIT: usize = 10_000;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown rendering configuration.
    pub render: RenderConfig,
    /// Code block highlighting configuration.
    pub highlight: HighlightConfig,
    /// Copy button configuration.
    pub copy_button: CopyButtonConfig,
    /// Math typesetting configuration.
    pub math: MathConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Treat single newlines as hard line breaks.
    pub hard_breaks: bool,
    /// Insert a thematic break after top-level h1-h3 headings.
    pub heading_separators: bool,
    /// Link bare URLs and e-mail addresses.
    pub autolinks: bool,
    /// Maximum nesting depth of markdown and raw HTML.
    pub max_depth: usize,
    /// HTML emitted when rendering fails.
    pub fallback_html: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            heading_separators: true,
            autolinks: true,
            max_depth: 128,
            fallback_html: "<p>Failed to render markdown</p>".to_owned(),
        }
    }
}

/// Code block highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether fenced code blocks are highlighted.
    pub enabled: bool,
    /// Highlight theme name.
    pub theme: String,
    /// Language for code blocks without an info string.
    pub default_language: String,
    /// Keep the theme background color.
    pub keep_background: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: "InspiredGitHub".to_owned(),
            default_language: "text".to_owned(),
            keep_background: true,
        }
    }
}

/// Copy button configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CopyButtonConfig {
    /// Whether highlighted blocks get a copy button.
    pub enabled: bool,
    /// How long the button shows its success state, in milliseconds.
    pub feedback_duration_ms: u32,
}

impl Default for CopyButtonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feedback_duration_ms: 3000,
        }
    }
}

/// Math typesetting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    /// Whether `$…$` and `$$…$$` are typeset.
    pub enabled: bool,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self { enabled: true }
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quizmark.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(theme) = &settings.theme {
            self.highlight.theme.clone_from(theme);
        }
        if let Some(enabled) = settings.highlight_enabled {
            self.highlight.enabled = enabled;
        }
        if let Some(enabled) = settings.copy_button_enabled {
            self.copy_button.enabled = enabled;
        }
        if let Some(enabled) = settings.math_enabled {
            self.math.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_highlight()?;
        self.validate_copy_button()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.fallback_html, "render.fallback_html")?;
        let depth = self.render.max_depth;
        if depth == 0 || depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "render.max_depth must be between 1 and {MAX_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }

    fn validate_highlight(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.highlight.theme, "highlight.theme")?;
        require_non_empty(
            &self.highlight.default_language,
            "highlight.default_language",
        )?;
        Ok(())
    }

    fn validate_copy_button(&self) -> Result<(), ConfigError> {
        let duration = self.copy_button.feedback_duration_ms;
        if duration == 0 || duration > MAX_FEEDBACK_MS {
            return Err(ConfigError::Validation(format!(
                "copy_button.feedback_duration_ms must be between 1 and {MAX_FEEDBACK_MS}"
            )));
        }
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
        assert!(config.render.hard_breaks);
        assert!(config.render.heading_separators);
        assert_eq!(config.render.max_depth, 128);
        assert_eq!(
            config.render.fallback_html,
            "<p>Failed to render markdown</p>"
        );
        assert!(config.highlight.enabled);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.highlight.default_language, "text");
        assert!(config.copy_button.enabled);
        assert_eq!(config.copy_button.feedback_duration_ms, 3000);
        assert!(config.math.enabled);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.copy_button.feedback_duration_ms, 3000);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[render]
hard_breaks = false
heading_separators = false
autolinks = false
max_depth = 64
fallback_html = "<p>unavailable</p>"

[highlight]
enabled = true
theme = "base16-ocean.dark"
default_language = "plaintext"
keep_background = false

[copy_button]
enabled = false
feedback_duration_ms = 1500

[math]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.render.hard_breaks);
        assert!(!config.render.heading_separators);
        assert!(!config.render.autolinks);
        assert_eq!(config.render.max_depth, 64);
        assert_eq!(config.render.fallback_html, "<p>unavailable</p>");
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.highlight.default_language, "plaintext");
        assert!(!config.highlight.keep_background);
        assert!(!config.copy_button.enabled);
        assert_eq!(config.copy_button.feedback_duration_ms, 1500);
        assert!(!config.math.enabled);
    }

    #[test]
    fn test_parse_partial_section_keeps_defaults() {
        let toml = r#"
[copy_button]
feedback_duration_ms = 500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.copy_button.enabled);
        assert_eq!(config.copy_button.feedback_duration_ms, 500);
    }

    #[test]
    fn test_parse_invalid_type() {
        let toml = r"
[render]
max_depth = -1
";
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_apply_cli_settings_theme() {
        let mut config = Config::default();
        let settings = CliSettings {
            theme: Some("Solarized (dark)".to_owned()),
            ..Default::default()
        };
        config.apply_cli_settings(&settings);
        assert_eq!(config.highlight.theme, "Solarized (dark)");
    }

    #[test]
    fn test_apply_cli_settings_toggles() {
        let mut config = Config::default();
        let settings = CliSettings {
            highlight_enabled: Some(false),
            copy_button_enabled: Some(false),
            math_enabled: Some(false),
            ..Default::default()
        };
        config.apply_cli_settings(&settings);
        assert!(!config.highlight.enabled);
        assert!(!config.copy_button.enabled);
        assert!(!config.math.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(config.highlight.enabled);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_feedback_duration_zero() {
        let mut config = Config::default();
        config.copy_button.feedback_duration_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("feedback_duration_ms"));
    }

    #[test]
    fn test_validate_feedback_duration_too_long() {
        let mut config = Config::default();
        config.copy_button.feedback_duration_ms = 60_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_max_depth_bounds() {
        let mut config = Config::default();
        config.render.max_depth = 0;
        assert!(config.validate().is_err());
        config.render.max_depth = 10_001;
        assert!(config.validate().is_err());
        config.render.max_depth = 10_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_theme() {
        let mut config = Config::default();
        config.highlight.theme = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: highlight.theme cannot be empty"
        );
    }

    #[test]
    fn test_validate_empty_fallback() {
        let mut config = Config::default();
        config.render.fallback_html = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[math]\nenabled = false\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert!(!config.math.enabled);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[highlight]\ntheme = \"base16-ocean.dark\"\n").unwrap();

        let settings = CliSettings {
            theme: Some("InspiredGitHub".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.highlight.theme, "InspiredGitHub");
    }

    #[test]
    fn test_load_rejects_empty_cli_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            theme: Some(String::new()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[copy_button]\nfeedback_duration_ms = 0\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
