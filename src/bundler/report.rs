use crate::bundler::{BundleProgress, SortMode};
use crate::error::{BundlerError, UserFriendlyError};
use crate::scanner::{Language, SourceFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Outcome of one `bundle` run, printed by the output formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleReport {
    pub output_path: String,
    pub language: Option<String>,
    /// Sort actually applied; `None` keeps collector order
    pub sort: Option<String>,
    pub files: Vec<FileInfo>,
    pub summary: BundleSummary,
    pub warnings: Vec<String>,
    pub aborted: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleSummary {
    pub files_bundled: usize,
    pub files_failed: usize,
    pub lines_written: u64,
    pub marker_lines: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
    pub duration: Duration,
    pub files_by_extension: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub path: String,
    pub relative_path: String,
    pub extension: String,
    pub size: u64,
}

impl From<&SourceFile> for FileInfo {
    fn from(file: &SourceFile) -> Self {
        Self {
            filename: file.filename.clone(),
            path: file.source_path.display().to_string(),
            relative_path: file.relative_path.to_string_lossy().to_string(),
            extension: file.extension.clone(),
            size: file.size,
        }
    }
}

impl BundleReport {
    pub fn new(output_path: &Path) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            language: None,
            sort: None,
            files: Vec::new(),
            summary: BundleSummary::default(),
            warnings: Vec::new(),
            aborted: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language.map(|l| l.name().to_string());
        self
    }

    pub fn with_sort(mut self, sort: Option<SortMode>) -> Self {
        self.sort = sort.map(|s| s.name().to_string());
        self
    }

    pub fn with_files(mut self, files: &[SourceFile]) -> Self {
        self.files = files.iter().map(FileInfo::from).collect();
        self.summary.files_by_extension.clear();
        for file in files {
            *self
                .summary
                .files_by_extension
                .entry(file.extension.clone())
                .or_insert(0) += 1;
        }
        self
    }

    pub fn record_progress(&mut self, progress: &BundleProgress) {
        self.summary.files_bundled = progress.files_processed;
        self.summary.files_failed = progress.errors.len();
        self.summary.lines_written = progress.lines_written;
        self.summary.marker_lines = progress.marker_lines;
        self.summary.lines_skipped = progress.lines_skipped;
        self.summary.bytes_read = progress.bytes_read;
        self.summary.duration = progress.elapsed();

        for error in &progress.errors {
            self.add_warning(error);
        }
    }

    pub fn add_warning(&mut self, error: &BundlerError) {
        self.warnings.push(error.user_message());
    }

    pub fn set_aborted(&mut self, error: &BundlerError) {
        self.aborted = Some(error.user_message());
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// 0 clean, 2 finished with warnings, 1 aborted.
    pub fn exit_code(&self) -> i32 {
        if self.is_aborted() {
            1
        } else if !self.warnings.is_empty() {
            2
        } else {
            0
        }
    }
}
