use crate::config::FilterConfig;
use regex::Regex;
use std::path::{Component, Path};

/// Build-artifact directories that are never scanned.
pub const BUILTIN_EXCLUDED_DIRS: [&str; 3] = ["bin", "obj", "debug"];

pub struct FileFilter {
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        let mut exclude_dirs: Vec<String> = BUILTIN_EXCLUDED_DIRS
            .iter()
            .map(|dir| dir.to_string())
            .collect();
        for dir in &config.exclude_dirs {
            let dir = dir.to_lowercase();
            if !exclude_dirs.contains(&dir) {
                exclude_dirs.push(dir);
            }
        }

        Self {
            exclude_dirs,
            exclude_patterns,
        }
    }

    pub fn is_source_file(&self, path: &Path, extension: &str) -> bool {
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));

        matches_extension && !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if self.is_excluded_dir_name(dir_name) {
                return false;
            }

            if self.matches_any_pattern(&path.to_string_lossy()) {
                return false;
            }
        }

        true
    }

    /// True when any directory segment of `relative` is excluded.
    pub fn contains_excluded_segment(&self, relative: &Path) -> bool {
        let mut segments: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        // the last segment is the file itself
        segments.pop();

        segments.iter().any(|s| self.is_excluded_dir_name(s))
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    fn is_excluded_dir_name(&self, dir_name: &str) -> bool {
        let dir_name_lower = dir_name.to_lowercase();
        self.exclude_dirs
            .iter()
            .any(|exclude| *exclude == dir_name_lower)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
