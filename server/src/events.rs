//! Buffer between asynchronous input arrival and the tick.
//!
//! Producers (network tasks, one per connection in spirit) only append. The
//! tick drains everything at once, so an event is applied in exactly one tick
//! and never half-way through one.

use snake_shared::Direction;
use std::sync::{Arc, Mutex, MutexGuard};

/// A directional input for a named player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub player_name: String,
    pub direction: Direction,
    pub pressed: bool,
}

impl Event {
    pub fn new(player_name: impl Into<String>, direction: Direction, pressed: bool) -> Self {
        Self {
            player_name: player_name.into(),
            direction,
            pressed,
        }
    }
}

/// Cloneable handle to a shared FIFO of events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<Vec<Event>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        // A panicking producer cannot leave a half-pushed Vec behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends an event. Never blocks on the tick for longer than a swap.
    pub fn enqueue(&self, event: Event) {
        self.lock().push(event);
    }

    /// Removes and returns every queued event in arrival order.
    pub fn drain_all(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
