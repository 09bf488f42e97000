use crate::config::FilterConfig;
use crate::error::{BundlerError, Result};
use crate::scanner::file_filter::FileFilter;
use crate::scanner::Language;
use crate::ui::output::format_bytes;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path, written verbatim into source notes
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
        }
    }
}

/// Result of a multi-extension collection. `error` holds the failure that
/// stopped the scan; `files` keeps what earlier sub-scans gathered.
#[derive(Debug, Default)]
pub struct Collection {
    pub files: Vec<SourceFile>,
    pub error: Option<BundlerError>,
}

pub struct SourceScanner {
    filter: FileFilter,
    max_depth: Option<usize>,
    skip_files: Vec<PathBuf>,
}

impl SourceScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            skip_files: Vec::new(),
        }
    }

    /// Never collect `path`, e.g. the bundle being written.
    pub fn with_skipped_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.skip_files.push(absolute(&path.into()));
        self
    }

    /// Collects every file under `root` for `language`, one sub-scan per
    /// extension. Stops at the first failing sub-scan.
    pub fn collect<P: AsRef<Path>>(&self, root: P, language: Language) -> Collection {
        let root = root.as_ref();
        collect_sub_scans(language.extensions(), |extension| {
            self.scan_extension(root, extension)
        })
    }

    /// Scans for one extension. Either every match is returned or the
    /// failure is; nothing partial.
    pub fn scan_extension<P: AsRef<Path>>(&self, root: P, extension: &str) -> Result<Vec<SourceFile>> {
        let root_path = absolute(root.as_ref());

        if !root_path.is_dir() {
            let kind = if root_path.exists() {
                io::ErrorKind::Other
            } else {
                io::ErrorKind::NotFound
            };
            return Err(BundlerError::directory_access(
                root_path.display().to_string(),
                io::Error::new(kind, "not a readable directory"),
            ));
        }

        let mut files = Vec::new();

        let mut walker = WalkDir::new(&root_path)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let entries = walker
            .into_iter()
            .filter_entry(|e| self.should_traverse(e, &root_path));

        for entry in entries {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .unwrap_or(root_path.as_path())
                    .display()
                    .to_string();
                BundlerError::directory_access(path, io::Error::from(err))
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&root_path)
                .unwrap_or(entry.path())
                .to_path_buf();

            if !self.filter.is_source_file(&relative_path, extension) {
                continue;
            }

            if self.skip_files.iter().any(|skip| skip == entry.path()) {
                debug!(path = %entry.path().display(), "skipping bundle output");
                continue;
            }

            let metadata = entry.metadata().map_err(|err| {
                BundlerError::directory_access(entry.path().display().to_string(), io::Error::from(err))
            })?;

            files.push(SourceFile::new(
                entry.path().to_path_buf(),
                relative_path,
                metadata.len(),
            ));
        }

        Ok(files)
    }

    fn should_traverse(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        self.filter.should_traverse_directory(relative)
    }

    pub fn get_statistics(&self, files: &[SourceFile]) -> ScanStatistics {
        let mut files_by_extension = BTreeMap::new();
        for file in files {
            *files_by_extension.entry(file.extension.clone()).or_insert(0) += 1;
        }

        ScanStatistics {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            files_by_extension,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: BTreeMap<String, usize>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        for (ext, count) in &self.files_by_extension {
            summary.push_str(&format!("    {}: {} files\n", ext, count));
        }

        summary
    }
}

/// Runs one sub-scan per extension in order, stopping at the first failure.
fn collect_sub_scans<F>(extensions: Vec<&'static str>, mut scan: F) -> Collection
where
    F: FnMut(&'static str) -> Result<Vec<SourceFile>>,
{
    let mut collection = Collection::default();

    for extension in extensions {
        match scan(extension) {
            Ok(mut files) => {
                debug!(extension, count = files.len(), "sub-scan finished");
                collection.files.append(&mut files);
            }
            Err(err) => {
                warn!(extension, error = %err, "sub-scan aborted");
                collection.error = Some(err);
                break;
            }
        }
    }

    collection
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
