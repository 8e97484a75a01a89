//! Gameplay tuning for a session. Runtime settings (address, tick rate,
//! capacity) live on the command line in `main.rs`.

use crate::player::DEFAULT_ANGLE_PER_TICK;
use snake_shared::MIN_NAME_LENGTH;
use std::fmt;
use std::time::Duration;

pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);
pub const TIMEOUT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub arena_width: f64,
    pub arena_height: f64,
    /// Radius of every head and trail circle.
    pub snake_radius: f64,
    /// Distance a head travels per tick.
    pub step_distance: f64,
    pub angle_per_tick: i32,
    /// Newest own-trail segments ignored by the self-collision test.
    pub self_collision_grace: usize,
    pub score_per_tick: u64,
    pub spawn_attempts: u32,
    /// Minimum free space between a spawn point and any existing snake.
    pub spawn_clearance: f64,
    pub min_name_length: usize,
    /// Fixed seed for spawn points and hashes; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 100.0,
            arena_height: 100.0,
            snake_radius: 2.0,
            step_distance: 5.0,
            angle_per_tick: DEFAULT_ANGLE_PER_TICK,
            self_collision_grace: 3,
            score_per_tick: 1,
            spawn_attempts: 32,
            spawn_clearance: 10.0,
            min_name_length: MIN_NAME_LENGTH,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidArena { width: f64, height: f64 },
    InvalidRadius(f64),
    InvalidStep(f64),
    ArenaTooSmall { radius: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArena { width, height } => {
                write!(f, "arena must have positive size, got {}x{}", width, height)
            }
            ConfigError::InvalidRadius(radius) => {
                write!(f, "snake radius must be positive, got {}", radius)
            }
            ConfigError::InvalidStep(step) => {
                write!(f, "step distance must be positive, got {}", step)
            }
            ConfigError::ArenaTooSmall { radius } => {
                write!(f, "arena cannot fit a snake of radius {}", radius)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if !(self.snake_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.snake_radius));
        }
        if !(self.step_distance > 0.0) {
            return Err(ConfigError::InvalidStep(self.step_distance));
        }
        if self.snake_radius * 2.0 > self.arena_width.min(self.arena_height) {
            return Err(ConfigError::ArenaTooSmall {
                radius: self.snake_radius,
            });
        }
        Ok(())
    }
}
