//! A snake is a moving head circle plus the trail it leaves behind.
//!
//! Lifecycle is `alive -> advance* -> dead`. Death is decided by the game's
//! collision pass, never by the snake itself, so every snake in a tick is
//! tested against the same post-movement world.

use crate::geometry::{Circle, Trail};
use snake_shared::Direction;

/// Normalizes any angle in degrees into `0..360`.
pub fn normalize_heading(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

#[derive(Debug, Clone)]
pub struct Snake {
    head: Circle,
    heading: i32,
    trail: Trail,
    /// Turn currently held by the owning player, if any.
    pub direction: Option<Direction>,
    alive: bool,
}

impl Snake {
    pub fn new(head: Circle, heading: i32) -> Self {
        Self {
            head,
            heading: normalize_heading(heading),
            trail: Trail::new(),
            direction: None,
            alive: true,
        }
    }

    pub fn head(&self) -> &Circle {
        &self.head
    }

    pub fn heading(&self) -> i32 {
        self.heading
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Moves one tick forward.
    ///
    /// `turn` is the signed heading change in degrees for this tick. The
    /// heading is always derived from the previous heading, never recomputed
    /// from history. The old head position becomes the newest trail segment.
    pub fn advance(&mut self, turn: i32, distance: f64) {
        if !self.alive {
            return;
        }

        self.heading = normalize_heading(self.heading + turn);
        let next = self.head.moved(self.heading, distance);
        self.trail.push(self.head);
        self.head = next;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Whether the head overlaps this snake's own trail, ignoring the
    /// `grace` newest segments that always sit right behind the head.
    pub fn hits_own_trail(&self, grace: usize) -> bool {
        self.trail.intersects(&self.head, grace)
    }

    /// Whether `circle` overlaps this snake's head or any trail segment.
    pub fn hits(&self, circle: &Circle) -> bool {
        self.head.intersects(circle) || self.trail.intersects(circle, 0)
    }

    /// Whether `circle` comes within `margin` of any part of the snake.
    pub fn is_near(&self, circle: &Circle, margin: f64) -> bool {
        let padded = Circle::new(circle.x, circle.y, circle.radius + margin);
        self.hits(&padded)
    }
}
