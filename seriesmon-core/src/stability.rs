//! Detection of runs of unchanged values.

/// The current run of equal values: its length and when it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stability {
    pub count: u64,
    pub since: i64,
}

impl Stability {
    /// The run started by a series' very first observation.
    pub const fn start(timestamp: i64) -> Self {
        Self {
            count: 1,
            since: timestamp,
        }
    }

    /// Advance the run with a new observation.
    ///
    /// `previous` is the value observed immediately before `value`, or `None`
    /// if this is the first observation.
    pub fn next(self, previous: Option<i64>, value: i64, timestamp: i64) -> Self {
        match previous {
            Some(prev) if prev == value => Self {
                count: self.count + 1,
                since: self.since,
            },
            _ => Self::start(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_starts_run() {
        let s = Stability::start(0).next(None, 5, 42);
        assert_eq!(s, Stability { count: 1, since: 42 });
    }

    #[test]
    fn equal_value_extends_run() {
        let s = Stability::start(10).next(Some(5), 5, 20).next(Some(5), 5, 30);
        assert_eq!(s, Stability { count: 3, since: 10 });
    }

    #[test]
    fn changed_value_restarts_run() {
        let s = Stability::start(10).next(Some(5), 5, 20).next(Some(5), 6, 30);
        assert_eq!(s, Stability { count: 1, since: 30 });
    }
}
