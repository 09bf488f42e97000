use crate::bundler::SortMode;
use crate::error::{BundlerError, Result};
use crate::response::prompt::{ask_typed, Prompter};
use crate::scanner::Language;
use std::fs;
use std::path::{Path, PathBuf};

pub const OUTPUT_QUESTION: &str = "route/name bundle file";
pub const LANGUAGE_QUESTION: &str = "Language (csharp/fsharp/vb/pwsh/sql/all)";
pub const NOTE_QUESTION: &str = "Include note (true/false)";
pub const SORT_QUESTION: &str = "Sort by (alphabetical/extension)";
pub const REMOVE_EMPTY_LINES_QUESTION: &str = "Remove empty lines (true/false)";
pub const AUTHOR_QUESTION: &str = "Author";

/// The six bundle options gathered by `create-rsp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAnswers {
    pub output: PathBuf,
    pub language: Language,
    pub note: bool,
    pub sort: SortMode,
    pub remove_empty_lines: bool,
    pub author: Option<String>,
}

impl ResponseAnswers {
    /// Asks every question in order, repeating a question until its answer parses.
    pub fn collect<P: Prompter + ?Sized>(prompter: &mut P) -> Result<Self> {
        let output = ask_typed(prompter, OUTPUT_QUESTION, parse_output_path)?;
        let language = ask_typed(prompter, LANGUAGE_QUESTION, parse_language)?;
        let note = ask_typed(prompter, NOTE_QUESTION, parse_flag)?;
        let sort = ask_typed(prompter, SORT_QUESTION, parse_sort_mode)?;
        let remove_empty_lines = ask_typed(prompter, REMOVE_EMPTY_LINES_QUESTION, parse_flag)?;
        let author = prompter.ask(AUTHOR_QUESTION).map(|a| parse_author(&a))?;

        Ok(Self {
            output,
            language,
            note,
            sort,
            remove_empty_lines,
            author,
        })
    }

    /// Renders the answers as `bundle` arguments, one `--flag value` per line.
    pub fn to_response_file(&self) -> String {
        let mut lines = vec![
            format!("--output {}", self.output.display()),
            format!("--lang {}", self.language),
            format!("--note {}", self.note),
            format!("--sort {}", self.sort),
            format!("--remove-empty-lines {}", self.remove_empty_lines),
        ];
        if let Some(ref author) = self.author {
            lines.push(format!("--author {}", author));
        }

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Writes the response file, replacing any existing file at `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_response_file())
            .map_err(|e| BundlerError::output_access(path.display().to_string(), e))
    }
}

pub fn parse_output_path(answer: &str) -> Result<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(BundlerError::Prompt {
            message: "the bundle file path cannot be empty".to_string(),
        });
    }
    Ok(PathBuf::from(answer))
}

pub fn parse_language(answer: &str) -> Result<Language> {
    answer.trim().parse()
}

/// Empty answers keep the default sort.
pub fn parse_sort_mode(answer: &str) -> Result<SortMode> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(SortMode::default());
    }
    answer.to_lowercase().parse()
}

/// Accepts true/false, yes/no, y/n and 1/0; empty means false.
pub fn parse_flag(answer: &str) -> Result<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Ok(false),
        "true" | "yes" | "y" | "1" => Ok(true),
        other => Err(BundlerError::Prompt {
            message: format!("'{}' is not a valid boolean value (true/false)", other),
        }),
    }
}

pub fn parse_author(answer: &str) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}
