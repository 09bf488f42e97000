use crate::bundler::BundleOptions;
use crate::config::{CliOverrides, Config};
use crate::error::{BundlerError, Result};
use crate::ui::OutputMode;
use crate::BundleRequest;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Spelling of `--remove-empty-lines` kept for existing scripts and response files.
pub const REMOVE_EMPTY_LINES_SHORT: &str = "-rel";

/// Options whose next token is always their value.
const VALUE_OPTIONS: [&str; 13] = [
    "-o",
    "--output",
    "-l",
    "--lang",
    "-s",
    "--sort",
    "-a",
    "--author",
    "-x",
    "--exclude",
    "-c",
    "--config",
    "--output-format",
];

#[derive(Parser, Debug)]
#[command(name = "codebundle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bundle the source files of a project into a single text file")]
#[command(
    long_about = "codebundle collects the source files of one language (or all of them) \
                  below the current directory and concatenates them into one file, \
                  optionally sorted, annotated and stripped of blank lines."
)]
#[command(after_help = "EXAMPLES:\n  \
    codebundle bundle -o all.txt -l csharp\n  \
    codebundle bundle -o all.txt -l all --sort extension --note -rel\n  \
    codebundle bundle -o all.txt -l sql --author \"Jane Doe\" --overwrite\n  \
    codebundle create-rsp -o bundle.rsp\n  \
    codebundle bundle @bundle.rsp\n\n\
    Arguments starting with @ are read from a response file, one option per line.")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect, sort and concatenate source files into one bundle file
    Bundle(BundleArgs),
    /// Ask for bundle options and save them as a response file
    CreateRsp(CreateRspArgs),
    /// Write a sample configuration file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Bundle file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Language to collect: csharp, fsharp, vb, pwsh, sql or all
    #[arg(short, long)]
    pub lang: String,

    /// Write a `//<path>` line before each file's content
    #[arg(
        short,
        long,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub note: Option<bool>,

    /// File order: alphabetical or extension
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Drop lines that are empty or whitespace only (also -rel)
    #[arg(
        long,
        alias = "rel",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub remove_empty_lines: Option<bool>,

    /// Write `//Author : <name>` as the first line of the bundle
    #[arg(short, long, allow_hyphen_values = true)]
    pub author: Option<String>,

    /// Truncate the bundle file instead of appending to it
    #[arg(long)]
    pub overwrite: bool,

    /// List the files that would be bundled, in order, without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Additional directory names to skip (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct CreateRspArgs {
    /// Response file to write
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Configuration file to write
    #[arg(short, long, default_value = "codebundle.toml")]
    pub output: PathBuf,

    /// Replace an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    /// Loads the configuration for this invocation. Bundle options given on
    /// the command line override the config file.
    pub fn load_config(&self, search_dir: &Path) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref(), search_dir)?;

        if let Commands::Bundle(ref args) = self.command {
            config.merge_with_cli_args(&args.create_cli_overrides());
        }
        config.validate()?;

        Ok(config)
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }
}

impl BundleArgs {
    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_exclude(self.exclude.clone())
            .with_note(self.note)
            .with_remove_empty_lines(self.remove_empty_lines)
            .with_author(self.author.clone())
            .with_append(if self.overwrite { Some(false) } else { None })
    }

    /// Builds the bundle request from a config that already holds the
    /// command-line overrides.
    pub fn to_request(&self, config: &Config) -> BundleRequest {
        let options = BundleOptions::new(self.output.clone())
            .with_source_note(config.bundle.note)
            .with_remove_empty_lines(config.bundle.remove_empty_lines)
            .with_author(config.bundle.author.clone())
            .with_append(config.bundle.append);

        BundleRequest {
            language: self.lang.clone(),
            sort: self
                .sort
                .clone()
                .unwrap_or_else(|| config.bundle.sort.name().to_string()),
            options,
            dry_run: self.dry_run,
        }
    }
}

/// Expands `@file` response files in place and rewrites `-rel`.
/// The first argument (program name) is passed through untouched, and so
/// is any token in the value position of an option like `--author`.
pub fn expand_args<I, T>(args: I) -> Result<Vec<OsString>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut expanded: Vec<OsString> = Vec::new();

    for (index, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if index == 0 || expanded.last().is_some_and(|prev| takes_value(prev)) {
            expanded.push(arg);
            continue;
        }

        match arg.to_str() {
            Some(text) if text.len() > 1 && text.starts_with('@') => {
                expanded.extend(read_response_file(Path::new(&text[1..]))?);
            }
            Some(REMOVE_EMPTY_LINES_SHORT) => expanded.push(OsString::from("--remove-empty-lines")),
            _ => expanded.push(arg),
        }
    }

    Ok(expanded)
}

fn takes_value(arg: &OsString) -> bool {
    arg.to_str().is_some_and(|arg| VALUE_OPTIONS.contains(&arg))
}

/// Each non-empty line that does not start with `#` holds a flag and an
/// optional value, separated by the first run of whitespace.
pub fn parse_response_file(content: &str) -> Vec<OsString> {
    let mut args = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (flag, value) = match line.split_once(char::is_whitespace) {
            Some((flag, value)) => (flag, value.trim()),
            None => (line, ""),
        };

        if flag == REMOVE_EMPTY_LINES_SHORT {
            args.push(OsString::from("--remove-empty-lines"));
        } else {
            args.push(OsString::from(flag));
        }
        if !value.is_empty() {
            args.push(OsString::from(value));
        }
    }

    args
}

fn read_response_file(path: &Path) -> Result<Vec<OsString>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| BundlerError::file_access(path.display().to_string(), e))?;
    Ok(parse_response_file(&content))
}
