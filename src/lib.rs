pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod response;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{BundleDefaults, CliOverrides, Config, FilterConfig};
pub use error::{BundlerError, Result, UserFriendlyError};

// Core functionality re-exports
pub use bundler::{sort_files, BundleOptions, BundleProgress, BundleReport, Bundler, SortMode};
pub use response::{LinePrompter, Prompter, ResponseAnswers, TerminalPrompter};
pub use scanner::{Collection, FileFilter, Language, SourceFile, SourceScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tracing::{debug, info};

/// One `bundle` invocation. Language and sort stay raw strings so that
/// invalid values are reported at run time instead of failing the parse.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub language: String,
    pub sort: String,
    pub options: BundleOptions,
    pub dry_run: bool,
}

impl BundleRequest {
    pub fn new<P: Into<std::path::PathBuf>>(output: P, language: &str) -> Self {
        Self {
            language: language.to_string(),
            sort: SortMode::default().name().to_string(),
            options: BundleOptions::new(output),
            dry_run: false,
        }
    }

    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = sort.to_string();
        self
    }

    pub fn with_options(mut self, options: BundleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Main library interface for codebundle functionality
pub struct CodeBundle {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl CodeBundle {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an instance from CLI arguments, looking for config files in `search_dir`
    pub fn from_cli(cli_args: &Cli, search_dir: &Path) -> Result<Self> {
        let config = cli_args.load_config(search_dir)?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Collects, sorts and writes the bundle for files below `root`.
    ///
    /// Never fails: invalid options, unreadable files and collection errors
    /// become warnings, an unwritable output marks the report aborted. The
    /// completion message is printed in every case.
    pub fn run_bundle<P: AsRef<Path>>(&self, root: P, request: &BundleRequest) -> BundleReport {
        let root = root.as_ref();
        let options = &request.options;
        let mut report = BundleReport::new(&options.output_path);

        let language = match request.language.parse::<Language>() {
            Ok(language) => Some(language),
            Err(e) => {
                self.handle_error(&e);
                report.add_warning(&e);
                None
            }
        };

        let mut files = Vec::new();
        if let Some(language) = language {
            let collection = self.collect_files(root, language, &options.output_path);
            if let Some(ref e) = collection.error {
                self.handle_error(e);
                report.add_warning(e);
            }
            files = collection.files;
        }

        let sort = match request.sort.parse::<SortMode>() {
            Ok(mode) => {
                files = sort_files(files, mode);
                Some(mode)
            }
            Err(e) => {
                self.handle_error(&e);
                report.add_warning(&e);
                None
            }
        };

        let mut report = report
            .with_language(language)
            .with_sort(sort)
            .with_files(&files);

        if request.dry_run {
            self.output_formatter
                .info("DRY RUN MODE - the bundle file will not be written");
            self.output_formatter.print_file_list(&files);
        } else {
            match self.write_bundle(&files, options) {
                Ok(progress) => {
                    self.progress_manager.suspend(|| {
                        for error in &progress.errors {
                            self.output_formatter.warning(&error.user_message());
                        }
                    });
                    report.record_progress(&progress);
                }
                Err(e) => {
                    self.handle_error(&e);
                    report.set_aborted(&e);
                }
            }
        }

        self.output_formatter.print_bundle_summary(&report);
        report
    }

    /// Collect source files for `language`, never picking up `output_path`
    fn collect_files(&self, root: &Path, language: Language, output_path: &Path) -> Collection {
        self.output_formatter
            .start_operation(&format!("Collecting {} files", language));

        let scanner = SourceScanner::new(&self.config.filters).with_skipped_file(output_path);
        let collection = scanner.collect(root, language);

        let stats = scanner.get_statistics(&collection.files);
        self.output_formatter.debug(&stats.display_summary());
        self.output_formatter
            .info(&format!("Found {} source files", collection.files.len()));

        collection
    }

    /// Write the bundle with progress tracking
    fn write_bundle(&self, files: &[SourceFile], options: &BundleOptions) -> Result<BundleProgress> {
        self.output_formatter.start_operation("Writing bundle");

        let file_progress = self.progress_manager.create_file_progress(files.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &BundleProgress| {
                ui::progress::update_bundle_progress(&pb, progress);
            }
        };

        let bundler = Bundler::new(options.clone());
        let result = bundler.bundle(files, Some(&progress_callback));

        match result {
            Ok(progress) => {
                ui::progress::finish_progress_with_summary(
                    &file_progress,
                    &format!("Bundled {} files", progress.files_processed),
                    progress.elapsed(),
                );
                info!(
                    output = %options.output_path.display(),
                    files = progress.files_processed,
                    "bundle written"
                );
                Ok(progress)
            }
            Err(e) => {
                file_progress.abandon();
                Err(e)
            }
        }
    }

    /// Asks for bundle options and saves them as a response file at `path`
    pub fn create_response_file<P, Q>(&self, path: P, prompter: &mut Q) -> Result<ResponseAnswers>
    where
        P: AsRef<Path>,
        Q: Prompter + ?Sized,
    {
        let path = path.as_ref();
        let answers = ResponseAnswers::collect(prompter)?;
        answers.write_to(path)?;
        debug!(path = %path.display(), "response file written");

        self.output_formatter
            .success(&format!("Response file created at {}", path.display()));
        self.output_formatter
            .info(&format!("Run it with: codebundle bundle @{}", path.display()));

        Ok(answers)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P, force: bool) -> Result<()> {
        let output_path = output_path.as_ref();
        if output_path.exists() && !force {
            return Err(BundlerError::Config {
                message: format!(
                    "{} already exists; use --force to replace it",
                    output_path.display()
                ),
            });
        }

        std::fs::write(output_path, Config::create_sample_config())
            .map_err(|e| BundlerError::output_access(output_path.display().to_string(), e))?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &BundlerError) {
        self.progress_manager
            .suspend(|| self.output_formatter.print_user_friendly_error(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_instance() -> CodeBundle {
        CodeBundle::new(Config::default(), OutputMode::Plain, 0, true)
    }

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("src/b.cs"), "class B {}\n").unwrap();
        fs::write(root.join("src/a.cs"), "class A {}\n\n").unwrap();
        fs::write(root.join("query.sql"), "select 1;\n").unwrap();
        fs::write(root.join("bin/gen.cs"), "// generated\n").unwrap();
        temp_dir
    }

    #[test]
    fn test_run_bundle_writes_sorted_files() {
        let temp_dir = project();
        let output = temp_dir.path().join("out.txt");

        let options = BundleOptions::new(&output).with_remove_empty_lines(true);
        let request = BundleRequest::new(&output, "csharp").with_options(options);
        let report = quiet_instance().run_bundle(temp_dir.path(), &request);

        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary.files_bundled, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "class A {}\nclass B {}\n");
    }

    #[test]
    fn test_run_bundle_invalid_language() {
        let temp_dir = project();
        let output = temp_dir.path().join("out.txt");

        let options = BundleOptions::new(&output).with_author(Some("Jane".to_string()));
        let request = BundleRequest::new(&output, "cobol").with_options(options);
        let report = quiet_instance().run_bundle(temp_dir.path(), &request);

        assert!(report.files.is_empty());
        assert_eq!(report.exit_code(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "//Author : Jane\n");
    }

    #[test]
    fn test_run_bundle_invalid_sort_keeps_collector_order() {
        let temp_dir = project();
        let output = temp_dir.path().join("out.txt");

        let request = BundleRequest::new(&output, "all").with_sort("size");
        let report = quiet_instance().run_bundle(temp_dir.path(), &request);

        assert!(report.sort.is_none());
        assert_eq!(report.exit_code(), 2);
        let order: Vec<&str> = report.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(order, vec!["a.cs", "b.cs", "query.sql"]);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let temp_dir = project();
        let output = temp_dir.path().join("out.txt");

        let request = BundleRequest::new(&output, "all").with_dry_run(true);
        let report = quiet_instance().run_bundle(temp_dir.path(), &request);

        assert_eq!(report.files.len(), 3);
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output_aborts() {
        let temp_dir = project();
        let output = temp_dir.path().join("missing-dir").join("out.txt");

        let request = BundleRequest::new(&output, "csharp");
        let report = quiet_instance().run_bundle(temp_dir.path(), &request);

        assert!(report.is_aborted());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_create_response_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bundle.rsp");
        let mut prompter = LinePrompter::new(
            std::io::Cursor::new("all.txt\nall\nno\n\nyes\n\n"),
            Vec::new(),
        );

        let answers = quiet_instance()
            .create_response_file(&path, &mut prompter)
            .unwrap();

        assert_eq!(answers.language, Language::All);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "--output all.txt\n--lang all\n--note false\n--sort alphabetical\n--remove-empty-lines true\n"
        );
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        CodeBundle::generate_sample_config(&config_path, false).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[filters]"));
        assert!(content.contains("[bundle]"));

        assert!(CodeBundle::generate_sample_config(&config_path, false).is_err());
        assert!(CodeBundle::generate_sample_config(&config_path, true).is_ok());
    }
}
