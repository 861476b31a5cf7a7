//! File-based metric source.
//!
//! Reads a JSON document of current values on every tick.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use seriesmon_core::{MetricSource, Observation, SeriesKey, SourceError};

/// The document a [`FileSource`] expects.
///
/// ```json
/// { "instance": "server", "values": { "ns:jvm HeapUsage": 512 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSample {
    pub instance: String,
    #[serde(default)]
    pub values: BTreeMap<String, i64>,
}

/// A metric source that reads current values from a JSON file.
///
/// Some other process keeps the file up to date; every tick reads it in full
/// and stamps each value with the tick time.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    path: PathBuf,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<FileSample, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl MetricSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self, now_ms: i64) -> Result<Vec<Observation>, SourceError> {
        let sample = self.read_file()?;
        Ok(sample
            .values
            .into_iter()
            .map(|(series, value)| {
                Observation::new(SeriesKey::new(sample.instance.clone(), series), now_ms, value)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "instance": "server",
            "values": {
                "ns:jvm HeapUsage": 512,
                "ns:jvm ThreadCount": 12
            }
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("jvm", "/tmp/jvm.json");
        assert_eq!(source.path(), Path::new("/tmp/jvm.json"));
        assert_eq!(source.name(), "jvm");
    }

    #[test]
    fn test_file_source_sample_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new("jvm", file.path());
        let observations = source.sample(1_000).unwrap();

        assert_eq!(
            observations,
            vec![
                Observation::new(SeriesKey::new("server", "ns:jvm HeapUsage"), 1_000, 512),
                Observation::new(SeriesKey::new("server", "ns:jvm ThreadCount"), 1_000, 12),
            ]
        );
    }

    #[test]
    fn test_file_source_rereads_every_tick() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let mut source = FileSource::new("jvm", file.path());
        let _ = source.sample(0).unwrap();

        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{ "instance": "server", "values": {{ "CpuUsage": 3 }} }}"#).unwrap();
        file.flush().unwrap();

        let observations = source.sample(5_000).unwrap();
        assert_eq!(
            observations,
            vec![Observation::new(SeriesKey::new("server", "CpuUsage"), 5_000, 3)]
        );
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("jvm", "/nonexistent/path/jvm.json");

        let err = source.sample(0).unwrap_err();
        assert!(matches!(err, SourceError::Read(_)));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new("jvm", file.path());

        let err = source.sample(0).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
        assert!(err.to_string().contains("Failed to parse sample"));
    }

    #[test]
    fn test_file_source_without_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "instance": "idle" }}"#).unwrap();

        let mut source = FileSource::new("jvm", file.path());
        assert!(source.sample(0).unwrap().is_empty());
    }
}
