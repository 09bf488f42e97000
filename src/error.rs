use std::fmt;
use std::io;
use thiserror::Error;

/// Why a filesystem access failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFailure {
    Denied,
    NotFound,
    Io,
    /// The path exists but cannot be read as a file (a directory, a dangling entry, ...)
    Unexpected,
}

impl AccessFailure {
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => AccessFailure::Denied,
            io::ErrorKind::NotFound => AccessFailure::NotFound,
            _ => AccessFailure::Io,
        }
    }
}

impl fmt::Display for AccessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AccessFailure::Denied => "access denied",
            AccessFailure::NotFound => "not found",
            AccessFailure::Io => "I/O error",
            AccessFailure::Unexpected => "unexpected error",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum BundlerError {
    #[error("Invalid value '{value}' for --{option}")]
    InvalidOption {
        option: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Cannot scan directory {path}: {reason}")]
    DirectoryAccess {
        path: String,
        reason: AccessFailure,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Cannot read {path}: {reason}")]
    FileAccess {
        path: String,
        reason: AccessFailure,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Cannot write bundle file {path}")]
    OutputAccess {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
}

impl BundlerError {
    pub fn directory_access(path: impl Into<String>, source: io::Error) -> Self {
        BundlerError::DirectoryAccess {
            path: path.into(),
            reason: AccessFailure::from_io(&source),
            source: Some(source),
        }
    }

    pub fn file_access(path: impl Into<String>, source: io::Error) -> Self {
        BundlerError::FileAccess {
            path: path.into(),
            reason: AccessFailure::from_io(&source),
            source: Some(source),
        }
    }

    pub fn output_access(path: impl Into<String>, source: io::Error) -> Self {
        BundlerError::OutputAccess {
            path: path.into(),
            source,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for BundlerError {
    fn user_message(&self) -> String {
        match self {
            BundlerError::InvalidOption { option, value, .. } => {
                format!("Invalid or missing {} option: '{}'", option, value)
            }
            BundlerError::DirectoryAccess { path, reason, .. } => match reason {
                AccessFailure::Denied => format!("Access to the directory is unauthorized: {}", path),
                AccessFailure::NotFound => format!("Directory not found: {}", path),
                _ => format!("An IO error occurred while scanning {}", path),
            },
            BundlerError::FileAccess { path, reason, source } => match (reason, source) {
                (AccessFailure::NotFound, _) => format!("File not found: {}", path),
                (_, Some(source)) => format!("Failed to read {}: {}", path, source),
                (reason, None) => format!("Failed to read {}: {}", path, reason),
            },
            BundlerError::OutputAccess { path, source } => {
                format!("Cannot write bundle file {}: {}", path, source)
            }
            BundlerError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            BundlerError::Prompt { message } => {
                format!("Could not read answer: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BundlerError::InvalidOption { option, allowed, .. } => Some(format!(
                "Allowed values for --{}: {}",
                option,
                allowed.join(", ")
            )),
            BundlerError::DirectoryAccess {
                reason: AccessFailure::Denied,
                ..
            } => Some(
                "Run from a directory you can read, or exclude the protected directory in codebundle.toml.".to_string()
            ),
            BundlerError::OutputAccess { .. } => Some(
                "Check that the destination directory exists and is writable (see --output).".to_string()
            ),
            BundlerError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all fields have the right type.".to_string()
            ),
            BundlerError::Prompt { .. } => Some(
                "Pipe the answers on stdin, one per line, or run the command in a terminal.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for BundlerError {
    fn from(error: toml::de::Error) -> Self {
        BundlerError::Config {
            message: error.to_string(),
        }
    }
}

impl From<dialoguer::Error> for BundlerError {
    fn from(error: dialoguer::Error) -> Self {
        BundlerError::Prompt {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BundlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = BundlerError::InvalidOption {
            option: "sort",
            value: "foo".to_string(),
            allowed: vec!["alphabetical", "extension"],
        };
        assert!(error.user_message().contains("sort"));
        assert!(error.user_message().contains("foo"));
        let suggestion = error.suggestion().unwrap();
        assert!(suggestion.contains("alphabetical, extension"));
    }

    #[test]
    fn test_access_failure_classification() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        let other = io::Error::new(io::ErrorKind::Other, "boom");

        assert_eq!(AccessFailure::from_io(&denied), AccessFailure::Denied);
        assert_eq!(AccessFailure::from_io(&missing), AccessFailure::NotFound);
        assert_eq!(AccessFailure::from_io(&other), AccessFailure::Io);
    }

    #[test]
    fn test_directory_access_messages() {
        let denied = BundlerError::directory_access(
            "/root/secret",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(denied.user_message().contains("unauthorized"));
        assert!(denied.suggestion().is_some());

        let missing = BundlerError::directory_access(
            "/nowhere",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.user_message().contains("Directory not found"));
    }

    #[test]
    fn test_access_error_messages() {
        let file_error = BundlerError::file_access(
            "a.cs",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(file_error.user_message().starts_with("File not found"));

        let output_error = BundlerError::output_access(
            "out.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(output_error.user_message().starts_with("Cannot write bundle file out.txt"));
    }
}
