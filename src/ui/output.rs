use crate::bundler::BundleReport;
use crate::error::{BundlerError, UserFriendlyError};
use crate::scanner::SourceFile;
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PACKAGE: Emoji = Emoji("📦 ", "> ");

pub const COMPLETION_MESSAGE: &str = "Bundle run finished";

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    /// Warnings are shown at the default verbosity; they report skipped work.
    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", PACKAGE, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &BundlerError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Lists files in bundle order (dry runs).
    pub fn print_file_list(&self, files: &[SourceFile]) {
        match self.mode {
            OutputMode::Json => {
                let paths: Vec<String> = files
                    .iter()
                    .map(|f| f.source_path.display().to_string())
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "file_list",
                    "files": paths
                }));
            }
            _ => {
                for file in files {
                    println!("{}", file.source_path.display());
                }
            }
        }
    }

    /// Prints the run summary. The completion line is printed in every mode,
    /// quiet included, whether or not the bundle was written.
    pub fn print_bundle_summary(&self, report: &BundleReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_summary(report);
                }
                println!("{}.", COMPLETION_MESSAGE);
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "report",
                    "message": COMPLETION_MESSAGE,
                    "report": report,
                }));
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_summary(report);
                }
                println!("COMPLETED: {}", COMPLETION_MESSAGE);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_summary(&self, report: &BundleReport) {
        let summary = &report.summary;

        println!();
        self.print_separator();

        match (&report.aborted, self.use_colors) {
            (Some(reason), true) => println!("{}{}", CROSS, style(format!("Bundle aborted: {}", reason)).red().bold()),
            (Some(reason), false) => println!("✗ Bundle aborted: {}", reason),
            (None, true) => println!("{} {}", style("Bundle completed!").green().bold(), CHECKMARK),
            (None, false) => println!("✓ Bundle completed!"),
        }

        println!();
        println!("  Output:          {}", report.output_path);
        if let Some(ref language) = report.language {
            println!("  Language:        {}", language);
        }
        println!(
            "  Sort:            {}",
            report.sort.as_deref().unwrap_or("collector order")
        );
        println!("  Files bundled:   {}", self.highlight(summary.files_bundled.to_string()));
        println!("  Lines written:   {}", self.highlight(summary.lines_written.to_string()));
        if summary.lines_skipped > 0 {
            println!("  Blank lines cut: {}", summary.lines_skipped);
        }
        println!("  Bytes read:      {}", self.highlight(format_bytes(summary.bytes_read)));
        println!("  Time taken:      {}", self.highlight(format_duration(summary.duration)));

        if !report.warnings.is_empty() {
            println!();
            println!("Issues encountered:");
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
        }

        self.print_separator();
    }

    fn print_plain_summary(&self, report: &BundleReport) {
        if let Some(ref reason) = report.aborted {
            println!("ABORTED: {}", reason);
        }
        println!("Output: {}", report.output_path);
        println!("Files bundled: {}", report.summary.files_bundled);
        println!("Lines written: {}", report.summary.lines_written);
        println!("Bytes read: {}", report.summary.bytes_read);
        println!("Duration: {:?}", report.summary.duration);
        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
