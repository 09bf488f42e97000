pub mod prompt;
pub mod response_file;

pub use prompt::{ask_typed, LinePrompter, Prompter, TerminalPrompter};
pub use response_file::{
    parse_author, parse_flag, parse_language, parse_output_path, parse_sort_mode, ResponseAnswers,
};
