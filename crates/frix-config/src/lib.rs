//! Configuration management for frix.
//!
//! Parses `frix.toml` configuration files with serde and provides
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
//! - `root`
//! - `server.host`

mod expand;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the site root directory.
    pub root: Option<PathBuf>,
    /// Override the active key document.
    pub key: Option<String>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "frix.toml";

/// Engine configuration (`opt`).
///
/// Read-only during a render pass. Changing any field and rendering again
/// produces a page table derived entirely from the new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory of the site file tree.
    pub root: PathBuf,
    /// Active key document, relative to `root`.
    pub key: String,
    /// File-tree layout below `root`.
    pub paths: PathsConfig,
    /// Render output options.
    pub output: OutputConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Modifiers registered by name when the engine is constructed.
    pub modifiers: Vec<ModifierConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Directory layout of the site tree, relative to `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding content documents.
    pub content: PathBuf,
    /// Directory holding `.html` template fragments and their `.css` siblings.
    pub templates: PathBuf,
    /// Output directory for rendered pages and the stylesheet.
    pub bin: PathBuf,
    /// Filename of the aggregated stylesheet inside `bin`.
    pub stylesheet: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: PathBuf::from("content"),
            templates: PathBuf::from("templates"),
            bin: PathBuf::from("bin"),
            stylesheet: "main.css".to_owned(),
        }
    }
}

/// Render output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of rendered page files.
    pub extension: String,
    /// Whether rendered pages are written below `bin` in addition to the stylesheet.
    pub write_pages: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "html".to_owned(),
            write_pages: true,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// A modifier registration declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfig {
    /// Extension point name (e.g. `content`, `css`).
    pub target: String,
    /// Name of a built-in modifier (e.g. `minify`).
    pub modifier: String,
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} not set").
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

/// Require a path field to be non-empty and relative.
fn require_relative(path: &Path, field: &str) -> Result<(), ConfigError> {
    require_non_empty(&path.to_string_lossy(), field)?;
    if path.is_absolute() {
        return Err(ConfigError::Validation(format!(
            "{field} must be relative to root"
        )));
    }
    Ok(())
}

impl Config {
    /// Create a default configuration rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            key: "key.json".to_owned(),
            paths: PathsConfig::default(),
            output: OutputConfig::default(),
            server: ServerConfig::default(),
            modifiers: Vec::new(),
            config_path: None,
        }
    }

    /// Set the active key document.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set whether rendered pages are written to disk.
    #[must_use]
    pub fn with_write_pages(mut self, write_pages: bool) -> Self {
        self.output.write_pages = write_pages;
        self
    }

    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `frix.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
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
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.root.clone_from(root);
        }
        if let Some(key) = &settings.key {
            self.key.clone_from(key);
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
    }

    /// Path of the aggregated stylesheet, relative to `root`.
    #[must_use]
    pub fn stylesheet_path(&self) -> PathBuf {
        self.paths.bin.join(&self.paths.stylesheet)
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

    /// Create default config rooted at the current working directory.
    fn default_with_cwd() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    /// Modifier targets are checked by the engine when it registers them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.key, "key")?;
        require_relative(&self.paths.content, "paths.content")?;
        require_relative(&self.paths.templates, "paths.templates")?;
        require_relative(&self.paths.bin, "paths.bin")?;
        require_non_empty(&self.paths.stylesheet, "paths.stylesheet")?;
        require_non_empty(&self.output.extension, "output.extension")?;
        self.validate_server()?;
        for (index, modifier) in self.modifiers.iter().enumerate() {
            require_non_empty(&modifier.target, &format!("modifiers[{index}].target"))?;
            require_non_empty(&modifier.modifier, &format!("modifiers[{index}].modifier"))?;
        }
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let root = expand::expand_env(&self.root.to_string_lossy(), "root")?;
        self.root = PathBuf::from(root);
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve a relative `root` against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if self.root.is_relative() {
            self.root = config_dir.join(&self.root);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new("/site");

        assert_eq!(config.root, PathBuf::from("/site"));
        assert_eq!(config.key, "key.json");
        assert_eq!(config.paths.content, PathBuf::from("content"));
        assert_eq!(config.paths.templates, PathBuf::from("templates"));
        assert_eq!(config.stylesheet_path(), PathBuf::from("bin/main.css"));
        assert_eq!(config.output.extension, "html");
        assert!(config.output.write_pages);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.modifiers.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::new("."));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
root = "site"
key = "loop-test.json"

[paths]
content = "data"
templates = "tpl"
bin = "public"
stylesheet = "site.css"

[output]
extension = "htm"
write_pages = false

[server]
host = "0.0.0.0"
port = 9000

[[modifiers]]
target = "content"
modifier = "minify"

[[modifiers]]
target = "css"
modifier = "trim"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.key, "loop-test.json");
        assert_eq!(config.paths.content, PathBuf::from("data"));
        assert_eq!(config.stylesheet_path(), PathBuf::from("public/site.css"));
        assert_eq!(config.output.extension, "htm");
        assert!(!config.output.write_pages);
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.modifiers,
            vec![
                ModifierConfig {
                    target: "content".to_owned(),
                    modifier: "minify".to_owned(),
                },
                ModifierConfig {
                    target: "css".to_owned(),
                    modifier: "trim".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let config = Config::new("test/files/").with_key("loop-test.json");

        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["root"], "test/files/");
        assert_eq!(value["key"], "loop-test.json");
        assert_eq!(value["paths"]["bin"], "bin");
        assert!(value.get("config_path").is_none());
    }

    #[test]
    fn test_builders() {
        let config = Config::new("site")
            .with_key("other.json")
            .with_write_pages(false);

        assert_eq!(config.key, "other.json");
        assert!(!config.output.write_pages);
    }

    #[test]
    fn test_resolve_relative_root() {
        let mut config = Config::new("site");
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.root, PathBuf::from("/project/site"));
    }

    #[test]
    fn test_resolve_absolute_root_unchanged() {
        let mut config = Config::new("/srv/site");
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.root, PathBuf::from("/srv/site"));
    }

    #[test]
    fn test_validate_default_ok() {
        assert!(Config::new("/site").validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key() {
        let config = Config::new("/site").with_key("");

        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("key cannot be empty"));
    }

    #[test]
    fn test_validate_absolute_bin() {
        let mut config = Config::new("/site");
        config.paths.bin = PathBuf::from("/tmp/out");

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("paths.bin must be relative"));
    }

    #[test]
    fn test_validate_port_zero() {
        let mut config = Config::new("/site");
        config.server.port = 0;

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("server.port cannot be 0"));
    }

    #[test]
    fn test_validate_empty_modifier_name() {
        let mut config = Config::new("/site");
        config.modifiers.push(ModifierConfig {
            target: "content".to_owned(),
            modifier: String::new(),
        });

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("modifiers[0].modifier"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::new("/site");
        let overrides = CliSettings {
            key: Some("loop-test.json".to_owned()),
            port: Some(9000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.key, "loop-test.json");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
        assert_eq!(config.root, PathBuf::from("/site")); // Unchanged
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/frix.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("frix.toml");
        std::fs::write(&config_path, "root = \"site\"\nkey = \"main.json\"\n").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(config.root, temp_dir.path().join("site"));
        assert_eq!(config.key, "main.json");
        assert_eq!(config.config_path, Some(config_path));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("frix.toml");
        std::fs::write(&config_path, "[server]\nport = 9000\n").unwrap();
        let overrides = CliSettings {
            root: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };

        let config = Config::load(Some(&config_path), Some(&overrides)).unwrap();

        assert_eq!(config.root, PathBuf::from("/elsewhere"));
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("frix.toml");
        std::fs::write(&config_path, "root = [").unwrap();

        let err = Config::load(Some(&config_path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_expands_env_in_host() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("frix.toml");
        std::fs::write(
            &config_path,
            "[server]\nhost = \"${FRIX_TEST_LOAD_HOST:-0.0.0.0}\"\n",
        )
        .unwrap();
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("FRIX_TEST_LOAD_HOST");
        }

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
    }
}
