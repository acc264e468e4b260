//! Configuration management for tether.
//!
//! Parses `tether.toml` with serde and provides auto-discovery of the
//! config file in parent directories. Variable and link-parameter
//! values are HTML-escaped once at load; the renderer injects them
//! into escaped output as-is.
//!
//! ```toml
//! [site]
//! source_dir = "docs"
//! output_dir = "site"
//! resources_path = "/static"
//! next_text = "Next"
//!
//! [variables]
//! version = "1.4.2"
//!
//! [link_parameters]
//! repo = "https://example.com/repo"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tether.toml";

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// File content is not valid configuration.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Application configuration, immutable once loaded.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-level settings.
    pub site: SiteSection,
    /// `%name%` substitution values. Escaped after load.
    pub variables: HashMap<String, String>,
    /// `{param}` substitution values for link URLs. Escaped after load.
    pub link_parameters: HashMap<String, String>,

    /// Directory containing the config file (set after loading).
    #[serde(skip)]
    pub config_dir: PathBuf,
}

/// The `[site]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Source directory for markdown pages and referenced code.
    pub source_dir: String,
    /// Output directory for generated HTML.
    pub output_dir: String,
    /// Base path prepended to wiki image references.
    pub resources_path: String,
    /// Label for the generated "next page" link.
    pub next_text: Option<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            source_dir: "docs".to_owned(),
            output_dir: "site".to_owned(),
            resources_path: String::new(),
            next_text: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.escape_values();
        Ok(config)
    }

    /// Discover `tether.toml` in `start` or any parent directory.
    ///
    /// Falls back to defaults rooted at `start` when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a discovered file fails to load.
    pub fn find(start: &Path) -> Result<Self, ConfigError> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
            dir = current.parent();
        }
        Ok(Self {
            config_dir: start.to_path_buf(),
            ..Self::default()
        })
    }

    /// Source directory resolved against the config file location.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.config_dir.join(&self.site.source_dir)
    }

    /// Output directory resolved against the config file location.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.site.output_dir)
    }

    fn escape_values(&mut self) {
        for value in self.variables.values_mut() {
            *value = escape_html(value);
        }
        for value in self.link_parameters.values_mut() {
            *value = escape_html(value);
        }
    }
}

/// Escape HTML special characters in a configured value.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[site]
source_dir = "pages"
output_dir = "out"
resources_path = "/static"
next_text = "Next"

[variables]
version = "1.4.2"

[link_parameters]
repo = "https://example.com/r"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.site.source_dir, "pages");
        assert_eq!(config.site.output_dir, "out");
        assert_eq!(config.site.resources_path, "/static");
        assert_eq!(config.site.next_text.as_deref(), Some("Next"));
        assert_eq!(config.variables.get("version").unwrap(), "1.4.2");
        assert_eq!(config.source_dir(), dir.path().join("pages"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.source_dir, "docs");
        assert_eq!(config.site.output_dir, "site");
        assert_eq!(config.site.resources_path, "");
        assert!(config.site.next_text.is_none());
    }

    #[test]
    fn test_values_escaped_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[variables]
note = "<b>bold</b> & more"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.variables.get("note").unwrap(),
            "&lt;b&gt;bold&lt;/b&gt; &amp; more"
        );
    }

    #[test]
    fn test_find_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "[site]\nsource_dir = \"found\"\n");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::find(&nested).unwrap();
        assert_eq!(config.site.source_dir, "found");
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn test_find_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::find(dir.path()).unwrap();
        assert_eq!(config.site.source_dir, "docs");
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = Config::load(Path::new("/nonexistent/tether.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "not [valid");
        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
