//! Series identity.

use core::fmt;

/// Identifies one metric stream of one server instance.
///
/// Equality and hashing use both fields exactly (case-sensitive). The series
/// name may carry `tag:value` prefixes before the metric itself, as in
/// `ns:jvm HeapUsage`; the naming helpers read that structure but never take
/// part in equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesKey {
    /// The server process the series belongs to.
    pub instance: String,

    /// The full series name, tags included.
    pub series: String,
}

impl SeriesKey {
    /// Create a key for the given instance and series name.
    pub fn new(instance: impl Into<String>, series: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            series: series.into(),
        }
    }

    /// The instance name.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// The full series name.
    pub fn series(&self) -> &str {
        &self.series
    }

    /// The metric part of the series name: everything after the last space.
    pub fn metric(&self) -> &str {
        match self.series.rfind(' ') {
            Some(idx) => &self.series[idx + 1..],
            None => &self.series,
        }
    }

    /// The `tag:value` pairs preceding the metric.
    ///
    /// Tokens without a `:` are skipped.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        let prefix = match self.series.rfind(' ') {
            Some(idx) => &self.series[..idx],
            None => "",
        };
        prefix
            .split(' ')
            .filter_map(|token| token.split_once(':'))
    }

    /// The value of the first tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags().find(|(tag, _)| *tag == name).map(|(_, value)| value)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instance, self.series)
    }
}
