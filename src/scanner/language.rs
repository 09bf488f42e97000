use crate::error::BundlerError;
use std::fmt;
use std::str::FromStr;

/// Language selector chosen with `--lang`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    CSharp,
    FSharp,
    VisualBasic,
    PowerShell,
    Sql,
    All,
}

/// Every concrete language, in scan order.
pub const SUPPORTED_LANGUAGES: [Language; 5] = [
    Language::CSharp,
    Language::FSharp,
    Language::VisualBasic,
    Language::PowerShell,
    Language::Sql,
];

impl Language {
    pub const NAMES: [&'static str; 6] = ["csharp", "fsharp", "vb", "pwsh", "sql", "all"];

    pub fn name(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::FSharp => "fsharp",
            Language::VisualBasic => "vb",
            Language::PowerShell => "pwsh",
            Language::Sql => "sql",
            Language::All => "all",
        }
    }

    /// File extension for a concrete language, `None` for `All`.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Language::CSharp => Some("cs"),
            Language::FSharp => Some("fs"),
            Language::VisualBasic => Some("vb"),
            Language::PowerShell => Some("pwsh"),
            Language::Sql => Some("sql"),
            Language::All => None,
        }
    }

    /// Extensions covered by this selector, one per sub-scan.
    pub fn extensions(&self) -> Vec<&'static str> {
        match self.extension() {
            Some(ext) => vec![ext],
            None => SUPPORTED_LANGUAGES
                .iter()
                .filter_map(|lang| lang.extension())
                .collect(),
        }
    }
}

impl FromStr for Language {
    type Err = BundlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "csharp" => Ok(Language::CSharp),
            "fsharp" => Ok(Language::FSharp),
            "vb" => Ok(Language::VisualBasic),
            "pwsh" => Ok(Language::PowerShell),
            "sql" => Ok(Language::Sql),
            "all" => Ok(Language::All),
            other => Err(BundlerError::InvalidOption {
                option: "lang",
                value: other.to_string(),
                allowed: Self::NAMES.to_vec(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_extension_table() {
        assert_eq!(Language::CSharp.extension(), Some("cs"));
        assert_eq!(Language::FSharp.extension(), Some("fs"));
        assert_eq!(Language::VisualBasic.extension(), Some("vb"));
        assert_eq!(Language::PowerShell.extension(), Some("pwsh"));
        assert_eq!(Language::Sql.extension(), Some("sql"));
        assert_eq!(Language::All.extension(), None);
    }

    #[test]
    fn test_all_covers_every_extension_in_order() {
        assert_eq!(
            Language::All.extensions(),
            vec!["cs", "fs", "vb", "pwsh", "sql"]
        );
        assert_eq!(Language::Sql.extensions(), vec!["sql"]);
    }

    #[test]
    fn test_parse_names() {
        for name in Language::NAMES {
            let lang: Language = name.parse().unwrap();
            assert_eq!(lang.name(), name);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_language() {
        let err = "python".parse::<Language>().unwrap_err();
        match err {
            BundlerError::InvalidOption { option, value, allowed } => {
                assert_eq!(option, "lang");
                assert_eq!(value, "python");
                assert_eq!(allowed.len(), 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
