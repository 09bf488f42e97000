use crate::error::BundlerError;
use crate::scanner::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// By file name (last path segment)
    #[default]
    Alphabetical,
    /// By extension, keeping input order inside each extension
    Extension,
}

impl SortMode {
    pub const NAMES: [&'static str; 2] = ["alphabetical", "extension"];

    pub fn name(&self) -> &'static str {
        match self {
            SortMode::Alphabetical => "alphabetical",
            SortMode::Extension => "extension",
        }
    }
}

impl FromStr for SortMode {
    type Err = BundlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "alphabetical" => Ok(SortMode::Alphabetical),
            "extension" => Ok(SortMode::Extension),
            other => Err(BundlerError::InvalidOption {
                option: "sort",
                value: other.to_string(),
                allowed: Self::NAMES.to_vec(),
            }),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orders collected files. `sort_by` is stable, so equal keys keep their
/// collector order in both modes.
pub fn sort_files(mut files: Vec<SourceFile>, mode: SortMode) -> Vec<SourceFile> {
    match mode {
        SortMode::Alphabetical => files.sort_by(|a, b| {
            a.filename
                .to_lowercase()
                .cmp(&b.filename.to_lowercase())
                .then_with(|| a.filename.cmp(&b.filename))
        }),
        SortMode::Extension => files.sort_by(|a, b| a.extension.cmp(&b.extension)),
    }
    files
}
