pub mod file_bundler;
pub mod report;
pub mod sorter;

pub use file_bundler::{BundleOptions, BundleProgress, Bundler, FileCopy};
pub use report::{BundleReport, BundleSummary, FileInfo};
pub use sorter::{sort_files, SortMode};
