//! Circle primitives used for snake heads and trail segments.

use crate::arena::Arena;
use snake_shared::SegmentSnapshot;

/// A circle in arena space. Positions are `f64` so long sessions do not
/// accumulate visible drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            radius: radius.max(0.0),
        }
    }

    pub fn distance_to(&self, other: &Circle) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when the circles overlap. Circles that only touch do not count,
    /// so consecutive trail segments placed exactly `2r` apart never collide.
    pub fn intersects(&self, other: &Circle) -> bool {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let reach = self.radius + other.radius;

        dx * dx + dy * dy < reach * reach
    }

    /// True when the point lies inside the circle or on its edge.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// True when the whole circle, not only its center, lies inside the arena.
    pub fn contained_in(&self, arena: &Arena) -> bool {
        arena.contains(self.x - self.radius, self.y - self.radius)
            && arena.contains(self.x + self.radius, self.y + self.radius)
    }

    /// Circle moved `distance` along `heading` degrees. 0° points toward +y.
    pub fn moved(&self, heading: i32, distance: f64) -> Circle {
        let radians = (heading as f64).to_radians();
        Circle {
            x: self.x + distance * radians.sin(),
            y: self.y + distance * radians.cos(),
            radius: self.radius,
        }
    }
}

impl From<&Circle> for SegmentSnapshot {
    fn from(circle: &Circle) -> Self {
        SegmentSnapshot {
            x: circle.x,
            y: circle.y,
            radius: circle.radius,
        }
    }
}

/// Ordered history of circles, oldest first. Append-only while the owner lives.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    segments: Vec<Circle>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, circle: Circle) {
        self.segments.push(circle);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Circle] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Circle> {
        self.segments.last()
    }

    /// First segment overlapping `circle`, ignoring the `skip_recent` newest ones.
    pub fn first_hit(&self, circle: &Circle, skip_recent: usize) -> Option<&Circle> {
        let end = self.segments.len().saturating_sub(skip_recent);
        self.segments[..end].iter().find(|s| s.intersects(circle))
    }

    pub fn intersects(&self, circle: &Circle, skip_recent: usize) -> bool {
        self.first_hit(circle, skip_recent).is_some()
    }
}
