use crate::bundler::SortMode;
use crate::error::{BundlerError, Result};
use crate::scanner::file_filter::BUILTIN_EXCLUDED_DIRS;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["codebundle.toml", ".codebundle.toml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub filters: FilterConfig,
    pub bundle: BundleDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Directory names skipped in addition to bin, obj and debug
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: Option<usize>,
}

/// Values used for bundle options that are not given on the command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleDefaults {
    pub note: bool,
    pub sort: SortMode,
    pub remove_empty_lines: bool,
    pub author: Option<String>,
    pub append: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: BUILTIN_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            exclude_patterns: Vec::new(),
            max_depth: None,
        }
    }
}

impl Default for BundleDefaults {
    fn default() -> Self {
        Self {
            note: false,
            sort: SortMode::Alphabetical,
            remove_empty_lines: false,
            author: None,
            append: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BundlerError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BundlerError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| BundlerError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    /// Loads `config_path`, or the first default config file found in
    /// `search_dir`, or built-in defaults.
    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>, search_dir: &Path) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in DEFAULT_CONFIG_FILES {
                    let candidate = search_dir.join(default_path);
                    if candidate.exists() {
                        return Self::load_from_file(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, overrides: &CliOverrides) {
        if let Some(ref exclude) = overrides.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(note) = overrides.note {
            self.bundle.note = note;
        }

        if let Some(remove_empty_lines) = overrides.remove_empty_lines {
            self.bundle.remove_empty_lines = remove_empty_lines;
        }

        if let Some(ref author) = overrides.author {
            self.bundle.author = Some(author.clone());
        }

        if let Some(append) = overrides.append {
            self.bundle.append = append;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for pattern in &self.filters.exclude_patterns {
            if let Err(e) = Regex::new(pattern) {
                return Err(BundlerError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        if self.filters.max_depth == Some(0) {
            return Err(BundlerError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.filters.exclude_dirs.iter().any(|d| d.trim().is_empty()) {
            return Err(BundlerError::Config {
                message: "Excluded directory names must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub exclude: Option<Vec<String>>,
    pub note: Option<bool>,
    pub remove_empty_lines: Option<bool>,
    pub author: Option<String>,
    pub append: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_note(mut self, note: Option<bool>) -> Self {
        self.note = note;
        self
    }

    pub fn with_remove_empty_lines(mut self, remove: Option<bool>) -> Self {
        self.remove_empty_lines = remove;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_append(mut self, append: Option<bool>) -> Self {
        self.append = append;
        self
    }
}
