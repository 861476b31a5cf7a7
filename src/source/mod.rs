//! Metric sources provided by the command-line tool.

mod file;

pub use file::{FileSample, FileSource};
