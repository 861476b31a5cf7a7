//! # seriesmon-types
//!
//! Core types for series monitoring. This crate defines the vocabulary shared by
//! the collector and anything that consumes its output: the key identifying a
//! series for one instance, the raw samples, and the immutable snapshot handed
//! to the response layer.
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde. Snapshots serialize `observedSum`
//!   as a decimal string and `points` as a flat `[t0, v0, t1, v1, ...]` array.
//!
//! ## Example
//!
//! ```rust
//! use seriesmon_types::{BigInt, Point, SeriesKey, SeriesSnapshot};
//!
//! let key = SeriesKey::new("server", "ns:jvm HeapUsage");
//! assert_eq!(key.metric(), "HeapUsage");
//! assert_eq!(key.tag("ns"), Some("jvm"));
//!
//! let snapshot = SeriesSnapshot::builder(key)
//!     .point(Point::new(1_000, 40))
//!     .point(Point::new(2_000, 60))
//!     .build();
//!
//! assert_eq!(snapshot.values(), vec![40, 60]);
//! assert_eq!(snapshot.observed_sum, BigInt::from(100));
//! ```

mod key;
mod point;
mod snapshot;

pub use key::*;
pub use point::*;
pub use snapshot::*;

pub use num_bigint::BigInt;
