use crate::error::{BundlerError, Result, UserFriendlyError};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::io::{BufRead, Write};

/// Source of answers for `create-rsp`.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Called when an answer fails to parse, before the question is asked again.
    fn report_invalid(&mut self, error: &BundlerError);
}

/// Asks `question` until `parse` accepts the answer.
pub fn ask_typed<T, P, F>(prompter: &mut P, question: &str, parse: F) -> Result<T>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> Result<T>,
{
    loop {
        let answer = prompter.ask(question)?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(err) => prompter.report_invalid(&err),
        }
    }
}

/// Interactive prompts on a terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn report_invalid(&mut self, error: &BundlerError) {
        eprintln!("{}", style(error.user_message()).red().bold());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}", style(suggestion).cyan());
        }
    }
}

/// Reads one answer per line; used when stdin is not a terminal.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.writer, "{}: ", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(BundlerError::Prompt {
                message: format!("input ended before answering '{}'", question),
            });
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn report_invalid(&mut self, error: &BundlerError) {
        let _ = writeln!(self.writer);
        let _ = writeln!(self.writer, "Error: {}", error.user_message());
        if let Some(suggestion) = error.suggestion() {
            let _ = writeln!(self.writer, "{}", suggestion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_number(s: &str) -> Result<u32> {
        s.trim().parse().map_err(|_| BundlerError::Prompt {
            message: format!("'{}' is not a number", s),
        })
    }

    #[test]
    fn test_line_prompter_reads_answers() {
        let mut prompter = LinePrompter::new(Cursor::new("first\r\nsecond\n"), Vec::new());

        assert_eq!(prompter.ask("One").unwrap(), "first");
        assert_eq!(prompter.ask("Two").unwrap(), "second");

        let written = String::from_utf8(prompter.into_writer()).unwrap();
        assert_eq!(written, "One: Two: ");
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let mut prompter = LinePrompter::new(Cursor::new(""), Vec::new());
        let err = prompter.ask("Language").unwrap_err();
        assert!(matches!(err, BundlerError::Prompt { .. }));
    }

    #[test]
    fn test_ask_typed_retries_until_valid() {
        let mut prompter = LinePrompter::new(Cursor::new("abc\n\n42\n"), Vec::new());

        let value = ask_typed(&mut prompter, "Number", parse_number).unwrap();
        assert_eq!(value, 42);

        let written = String::from_utf8(prompter.into_writer()).unwrap();
        assert_eq!(written.matches("Number: ").count(), 3);
        assert!(written.contains("'abc' is not a number"));
    }

    #[test]
    fn test_ask_typed_gives_up_at_end_of_input() {
        let mut prompter = LinePrompter::new(Cursor::new("abc\n"), Vec::new());
        assert!(ask_typed(&mut prompter, "Number", parse_number).is_err());
    }
}
