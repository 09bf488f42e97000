pub mod file_filter;
pub mod language;
pub mod source_scanner;

pub use file_filter::FileFilter;
pub use language::{Language, SUPPORTED_LANGUAGES};
pub use source_scanner::{Collection, ScanStatistics, SourceFile, SourceScanner};
