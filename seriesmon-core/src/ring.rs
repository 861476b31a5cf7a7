//! Fixed-capacity store of recent points.

use std::collections::VecDeque;

use seriesmon_types::Point;

/// A circular buffer holding the most recent points of one series.
///
/// Appending to a full buffer discards the oldest point. Iteration order is
/// always chronological (oldest first).
#[derive(Debug, Clone)]
pub struct PointRing {
    points: VecDeque<Point>,
    capacity: usize,
}

impl PointRing {
    /// Create an empty ring. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest when full.
    pub fn append(&mut self, point: Point) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// An independent copy of the retained points, oldest first.
    pub fn snapshot(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }

    /// The most recently appended point.
    pub fn last(&self) -> Option<Point> {
        self.points.back().copied()
    }

    /// Iterate over retained points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(ring: &PointRing) -> Vec<i64> {
        ring.iter().map(|p| p.value).collect()
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = PointRing::new(4);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.last(), None);
    }

    #[test]
    fn zero_capacity_holds_one_point() {
        let mut ring = PointRing::new(0);
        ring.append(Point::new(0, 1));
        ring.append(Point::new(1, 2));

        assert_eq!(ring.capacity(), 1);
        assert_eq!(values(&ring), vec![2]);
    }

    #[test]
    fn keeps_insertion_order_below_capacity() {
        let mut ring = PointRing::new(5);
        for (t, v) in [(0, 3), (1, 1), (2, 2)] {
            ring.append(Point::new(t, v));
        }

        assert_eq!(values(&ring), vec![3, 1, 2]);
        assert_eq!(ring.last(), Some(Point::new(2, 2)));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut ring = PointRing::new(3);
        for t in 0..10 {
            ring.append(Point::new(t, t * 10));
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(values(&ring), vec![70, 80, 90]);
    }

    #[test]
    fn duplicates_are_retained() {
        let mut ring = PointRing::new(3);
        ring.append(Point::new(0, 7));
        ring.append(Point::new(0, 7));

        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn snapshot_is_independent_of_later_appends() {
        let mut ring = PointRing::new(2);
        ring.append(Point::new(0, 1));
        let before = ring.snapshot();

        ring.append(Point::new(1, 2));
        ring.append(Point::new(2, 3));

        assert_eq!(before, vec![Point::new(0, 1)]);
        assert_eq!(ring.snapshot(), vec![Point::new(1, 2), Point::new(2, 3)]);
    }
}
