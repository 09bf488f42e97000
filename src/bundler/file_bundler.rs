use crate::error::{AccessFailure, BundlerError, Result};
use crate::scanner::SourceFile;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Settings for one bundle write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub output_path: PathBuf,
    pub include_source_note: bool,
    pub remove_empty_lines: bool,
    pub author: Option<String>,
    /// Keep existing content of the output file instead of truncating it
    pub append: bool,
}

impl BundleOptions {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
            include_source_note: false,
            remove_empty_lines: false,
            author: None,
            append: true,
        }
    }

    pub fn with_source_note(mut self, note: bool) -> Self {
        self.include_source_note = note;
        self
    }

    pub fn with_remove_empty_lines(mut self, remove: bool) -> Self {
        self.remove_empty_lines = remove;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.is_empty());
        self
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

#[derive(Debug)]
pub struct BundleProgress {
    pub files_processed: usize,
    pub total_files: usize,
    /// Copied content lines, not counting author and source-note lines
    pub lines_written: u64,
    pub marker_lines: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<BundlerError>,
}

impl BundleProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            lines_written: 0,
            marker_lines: 0,
            lines_skipped: 0,
            bytes_read: 0,
            current_file: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn update_file(&mut self, filename: String, copy: &FileCopy) {
        self.files_processed += 1;
        self.lines_written += copy.lines_written;
        self.lines_skipped += copy.lines_skipped;
        self.bytes_read += copy.bytes_read;
        self.current_file = Some(filename);
    }

    pub fn add_error(&mut self, error: BundlerError) {
        self.errors.push(error);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Line counts for a single copied file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileCopy {
    pub lines_written: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
}

pub struct Bundler {
    options: BundleOptions,
    buffer_size: usize,
}

impl Bundler {
    pub fn new(options: BundleOptions) -> Self {
        Self {
            options,
            buffer_size: 64 * 1024,
        }
    }

    /// Writes `files` into the output file, in order. Per-file read
    /// failures are recorded in the returned progress; only failures on the
    /// output file itself abort the run.
    pub fn bundle(
        &self,
        files: &[SourceFile],
        progress_callback: Option<&dyn Fn(&BundleProgress)>,
    ) -> Result<BundleProgress> {
        let mut progress = BundleProgress::new(files.len());
        let output_path = self.options.output_path.as_path();

        let output = self.open_output()?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, output);

        if let Some(ref author) = self.options.author {
            writeln!(writer, "//Author : {}", author)
                .map_err(|e| output_error(output_path, e))?;
            progress.marker_lines += 1;
        }

        for file in files {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            match self.append_file(&mut writer, file) {
                Ok(copy) => {
                    if self.options.include_source_note {
                        progress.marker_lines += 1;
                    }
                    progress.update_file(file.filename.clone(), &copy);
                }
                Err(err @ BundlerError::OutputAccess { .. }) => return Err(err),
                Err(err) => {
                    debug!(path = %file.source_path.display(), error = %err, "skipping file");
                    progress.add_error(err);
                }
            }
        }

        writer
            .flush()
            .map_err(|e| output_error(output_path, e))?;

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        debug!(
            files = progress.files_processed,
            lines = progress.lines_written,
            "bundle written to {}",
            output_path.display()
        );

        Ok(progress)
    }

    fn open_output(&self) -> Result<File> {
        let path = &self.options.output_path;
        let mut open_options = OpenOptions::new();
        open_options.create(true);
        if self.options.append {
            open_options.append(true);
        } else {
            open_options.write(true).truncate(true);
        }

        open_options
            .open(path)
            .map_err(|e| output_error(path, e))
    }

    /// Copies one source file. The input handle lives only for this call.
    pub fn append_file<W: Write>(&self, writer: &mut W, file: &SourceFile) -> Result<FileCopy> {
        let source = file.source_path.as_path();
        let source_display = source.display().to_string();

        if source.exists() && !source.is_file() {
            return Err(BundlerError::FileAccess {
                path: source_display,
                reason: AccessFailure::Unexpected,
                source: None,
            });
        }

        let input = File::open(source)
            .map_err(|e| BundlerError::file_access(source_display.clone(), e))?;
        let mut reader = BufReader::with_capacity(self.buffer_size, input);

        if self.options.include_source_note {
            writeln!(writer, "//{}", source_display)
                .map_err(|e| output_error(&self.options.output_path, e))?;
        }

        let mut copy = FileCopy::default();
        let mut line = Vec::new();
        let mut first_line = true;

        loop {
            line.clear();
            let bytes_read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| BundlerError::file_access(source_display.clone(), e))?;

            if bytes_read == 0 {
                break;
            }
            copy.bytes_read += bytes_read as u64;

            let mut content = strip_line_ending(&line);
            if first_line {
                first_line = false;
                if line == UTF8_BOM {
                    break;
                }
                content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
            }

            // a lone carriage return also ends a line
            for segment in content.split(|b| *b == b'\r') {
                if self.options.remove_empty_lines && is_blank(segment) {
                    copy.lines_skipped += 1;
                    continue;
                }

                writer
                    .write_all(segment)
                    .map_err(|e| output_error(&self.options.output_path, e))?;
                writer
                    .write_all(b"\n")
                    .map_err(|e| output_error(&self.options.output_path, e))?;
                copy.lines_written += 1;
            }
        }

        Ok(copy)
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn output_error(path: &Path, error: std::io::Error) -> BundlerError {
    BundlerError::output_access(path.display().to_string(), error)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_blank(line: &[u8]) -> bool {
    String::from_utf8_lossy(line).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Counts lines the way the bundler splits them.
    fn count_lines(path: &Path, skip_blank: bool) -> u64 {
        let content = fs::read(path).unwrap();
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content[..]);
        content
            .split_inclusive(|b| *b == b'\n')
            .map(strip_line_ending)
            .flat_map(|line| line.split(|b| *b == b'\r'))
            .filter(|line| !(skip_blank && is_blank(line)))
            .count() as u64
    }

    fn source(dir: &Path, name: &str, content: &str) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        SourceFile::new(path, PathBuf::from(name), content.len() as u64)
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn test_blank_lines_removed() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n\n");
        let b = source(temp_dir.path(), "b.cs", "y\n");
        let output = temp_dir.path().join("out.txt");

        let bundler = Bundler::new(BundleOptions::new(&output).with_remove_empty_lines(true));
        let progress = bundler.bundle(&[a, b], None).unwrap();

        assert_eq!(read_lines(&output), vec!["x", "y"]);
        assert_eq!(progress.files_processed, 2);
        assert_eq!(progress.lines_written, 2);
        assert_eq!(progress.lines_skipped, 1);
        assert!(progress.errors.is_empty());
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.sql", "select 1;\n   \n\t\r\nselect 2;");
        let output = temp_dir.path().join("out.sql");

        let bundler = Bundler::new(BundleOptions::new(&output).with_remove_empty_lines(true));
        bundler.bundle(&[a], None).unwrap();

        assert_eq!(read_lines(&output), vec!["select 1;", "select 2;"]);
    }

    #[test]
    fn test_lines_preserved_without_removal() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "  indented\r\n\nlast");
        let output = temp_dir.path().join("out.txt");

        let bundler = Bundler::new(BundleOptions::new(&output));
        let progress = bundler.bundle(&[a], None).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "  indented\n\nlast\n");
        assert_eq!(progress.lines_written, 3);
    }

    #[test]
    fn test_author_and_source_notes() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let b = source(temp_dir.path(), "b.cs", "y\n");
        let output = temp_dir.path().join("out.txt");

        let options = BundleOptions::new(&output)
            .with_author(Some("Jane".to_string()))
            .with_source_note(true);
        let progress = Bundler::new(options).bundle(&[a.clone(), b.clone()], None).unwrap();

        let lines = read_lines(&output);
        assert_eq!(
            lines,
            vec![
                "//Author : Jane".to_string(),
                format!("//{}", a.source_path.display()),
                "x".to_string(),
                format!("//{}", b.source_path.display()),
                "y".to_string(),
            ]
        );
        assert_eq!(progress.marker_lines, 3);
        assert_eq!(progress.lines_written, 2);
    }

    #[test]
    fn test_author_written_even_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");

        let options = BundleOptions::new(&output).with_author(Some("Jane".to_string()));
        Bundler::new(options).bundle(&[], None).unwrap();

        assert_eq!(read_lines(&output), vec!["//Author : Jane"]);
    }

    #[test]
    fn test_empty_author_is_ignored() {
        let options = BundleOptions::new("out.txt").with_author(Some(String::new()));
        assert!(options.author.is_none());
    }

    #[test]
    fn test_append_mode_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let output = temp_dir.path().join("out.txt");

        let bundler = Bundler::new(BundleOptions::new(&output));
        bundler.bundle(std::slice::from_ref(&a), None).unwrap();
        bundler.bundle(std::slice::from_ref(&a), None).unwrap();

        assert_eq!(read_lines(&output), vec!["x", "x"]);
    }

    #[test]
    fn test_overwrite_mode_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let output = temp_dir.path().join("out.txt");
        fs::write(&output, "stale content that is longer\n").unwrap();

        let bundler = Bundler::new(BundleOptions::new(&output).with_append(false));
        bundler.bundle(&[a], None).unwrap();

        assert_eq!(read_lines(&output), vec!["x"]);
    }

    #[test]
    fn test_missing_file_does_not_abort() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let missing = SourceFile::new(temp_dir.path().join("gone.cs"), PathBuf::from("gone.cs"), 0);
        let c = source(temp_dir.path(), "c.cs", "z\n");
        let output = temp_dir.path().join("out.txt");

        let bundler = Bundler::new(BundleOptions::new(&output).with_source_note(true));
        let progress = bundler.bundle(&[a, missing, c], None).unwrap();

        assert_eq!(progress.files_processed, 2);
        assert_eq!(progress.errors.len(), 1);
        assert!(matches!(
            progress.errors[0],
            BundlerError::FileAccess {
                reason: AccessFailure::NotFound,
                ..
            }
        ));
        // no source note for a file that could not be opened
        let lines = read_lines(&output);
        assert_eq!(lines.len(), 4);
        assert!(!lines.iter().any(|l| l.contains("gone.cs")));
    }

    #[test]
    fn test_directory_input_is_unexpected() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("weird.cs");
        fs::create_dir(&dir).unwrap();
        let entry = SourceFile::new(dir, PathBuf::from("weird.cs"), 0);
        let output = temp_dir.path().join("out.txt");

        let progress = Bundler::new(BundleOptions::new(&output))
            .bundle(&[entry], None)
            .unwrap();

        assert!(matches!(
            progress.errors[0],
            BundlerError::FileAccess {
                reason: AccessFailure::Unexpected,
                ..
            }
        ));
    }

    #[test]
    fn test_unopenable_output_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let output = temp_dir.path().join("missing-dir").join("out.txt");

        let result = Bundler::new(BundleOptions::new(&output)).bundle(&[a], None);
        assert!(matches!(result, Err(BundlerError::OutputAccess { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_line_count_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let contents = ["a\n\nb\n", "\n\n", "c", "  \nd\r\ne\n", "", "\u{feff}x\r\ry\n"];
        let files: Vec<SourceFile> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| source(temp_dir.path(), &format!("f{i}.cs"), c))
            .collect();

        for remove in [false, true] {
            let output = temp_dir.path().join(format!("out-{remove}.txt"));
            let expected: u64 = files
                .iter()
                .map(|f| count_lines(&f.source_path, remove))
                .sum();

            let options = BundleOptions::new(&output)
                .with_remove_empty_lines(remove)
                .with_source_note(true)
                .with_author(Some("Jane".to_string()));
            let progress = Bundler::new(options).bundle(&files, None).unwrap();

            let non_marker = read_lines(&output)
                .iter()
                .filter(|l| !l.starts_with("//"))
                .count() as u64;
            assert_eq!(progress.lines_written, expected);
            assert_eq!(non_marker, expected);
        }
    }

    #[test]
    fn test_progress_callback_invoked() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "x\n");
        let b = source(temp_dir.path(), "b.cs", "y\n");
        let output = temp_dir.path().join("out.txt");

        let calls = std::cell::Cell::new(0);
        let callback = |_: &BundleProgress| calls.set(calls.get() + 1);
        Bundler::new(BundleOptions::new(&output))
            .bundle(&[a, b], Some(&callback))
            .unwrap();

        // once per file plus a final update
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_utf8_bom_is_not_copied() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "\u{feff}\nclass A {}\n");
        let b = source(temp_dir.path(), "b.cs", "\u{feff}class B {}\n");

        let output = temp_dir.path().join("kept.txt");
        Bundler::new(BundleOptions::new(&output))
            .bundle(&[a.clone(), b.clone()], None)
            .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "\nclass A {}\nclass B {}\n");

        let output = temp_dir.path().join("removed.txt");
        let progress = Bundler::new(BundleOptions::new(&output).with_remove_empty_lines(true))
            .bundle(&[a, b], None)
            .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "class A {}\nclass B {}\n");
        assert_eq!(progress.lines_skipped, 1);
    }

    #[test]
    fn test_bom_only_file_has_no_lines() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.cs", "\u{feff}");
        let output = temp_dir.path().join("out.txt");

        let progress = Bundler::new(BundleOptions::new(&output)).bundle(&[a], None).unwrap();
        assert_eq!(progress.lines_written, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_lone_carriage_return_ends_line() {
        let temp_dir = TempDir::new().unwrap();
        let a = source(temp_dir.path(), "a.vb", "a\rb\r\nc\r\rd");
        let output = temp_dir.path().join("out.txt");

        let progress = Bundler::new(BundleOptions::new(&output)).bundle(&[a], None).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "a\nb\nc\n\nd\n");
        assert_eq!(progress.lines_written, 5);
    }
}
