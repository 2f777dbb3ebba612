//! Bounded trail of recorded tip positions.

use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::vec_deque::{self, VecDeque};

/// Points reserved up front; larger trails grow on demand
const PREALLOCATE_LIMIT: usize = 1024;

/// Fixed-capacity FIFO of points; the oldest is evicted once the cap is exceeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl Trail {
    /// Create an empty trail holding at most `capacity` points
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(PREALLOCATE_LIMIT) + 1),
            capacity,
        }
    }

    /// Append a point, popping the oldest while over capacity
    pub fn push(&mut self, point: Vec3) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
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

    pub fn oldest(&self) -> Option<&Vec3> {
        self.points.front()
    }

    pub fn newest(&self) -> Option<&Vec3> {
        self.points.back()
    }

    /// Points from oldest to newest
    pub fn iter(&self) -> vec_deque::Iter<'_, Vec3> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl<'a> IntoIterator for &'a Trail {
    type Item = &'a Vec3;
    type IntoIter = vec_deque::Iter<'a, Vec3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> Vec3 {
        Vec3::new(i as f64, 0.0, 0.0)
    }

    #[test]
    fn test_fifty_first_point_evicts_oldest() {
        let mut trail = Trail::new(50);
        for i in 0..50 {
            trail.push(point(i));
        }
        assert_eq!(trail.len(), 50);
        assert_eq!(trail.oldest(), Some(&point(0)));

        trail.push(point(50));
        assert_eq!(trail.len(), 50);
        assert_eq!(trail.oldest(), Some(&point(1)));
        assert_eq!(trail.newest(), Some(&point(50)));
        assert!(trail.iter().all(|p| *p != point(0)));
    }

    #[test]
    fn test_never_exceeds_cap() {
        let mut trail = Trail::new(3);
        for i in 0..100 {
            trail.push(point(i));
            assert!(trail.len() <= 3);
        }
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![97.0, 98.0, 99.0]);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut trail = Trail::new(0);
        trail.push(point(1));
        assert!(trail.is_empty());
    }

    #[test]
    fn test_unbounded_capacity_does_not_overflow() {
        let mut trail = Trail::new(usize::MAX);
        assert_eq!(trail.capacity(), usize::MAX);
        trail.push(point(1));
        trail.push(point(2));
        assert_eq!(trail.len(), 2);
    }
}
