//! Authoritative simulation: players, arena, input queue and the tick.
//!
//! One tick is `drain inputs -> advance snakes -> collisions -> scores ->
//! notify`. Everything here runs on the single thread that owns the `Game`;
//! the only state shared with other tasks is the [`EventQueue`].

use crate::arena::Arena;
use crate::config::{ConfigError, GameConfig};
use crate::events::{Event, EventQueue};
use crate::geometry::Circle;
use crate::player::Player;
use crate::serializer;
use crate::snake::normalize_heading;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_shared::Snapshot;
use std::collections::HashMap;
use std::fmt;

pub type TickListener = Box<dyn FnMut(&Game) + Send>;

/// Why a snake died.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elimination {
    Boundary,
    OwnTrail,
    Snake(String),
}

impl fmt::Display for Elimination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Elimination::Boundary => write!(f, "left the arena"),
            Elimination::OwnTrail => write!(f, "ran into its own trail"),
            Elimination::Snake(other) => write!(f, "crashed into {}", other),
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    pub tick: u64,
    pub events_applied: usize,
    pub eliminated: Vec<(String, Elimination)>,
}

pub struct Game {
    config: GameConfig,
    arena: Arena,
    players: HashMap<String, Player>,
    /// Names in join order; fixes iteration order for collisions and snapshots.
    join_order: Vec<String>,
    events: EventQueue,
    tick: u64,
    rng: StdRng,
    listeners: Vec<TickListener>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            arena: Arena::new(config.arena_width, config.arena_height),
            config,
            players: HashMap::new(),
            join_order: Vec::new(),
            events: EventQueue::new(),
            tick: 0,
            rng,
            listeners: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.join_order
            .iter()
            .filter_map(move |name| self.players.get(name))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.is_alive()).count()
    }

    pub fn get_player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Registers a callback run at the end of every tick, in registration order.
    pub fn on_tick<F>(&mut self, listener: F)
    where
        F: FnMut(&Game) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Handle for producers on other tasks.
    pub fn event_queue(&self) -> EventQueue {
        self.events.clone()
    }

    pub fn add_event(&self, event: Event) {
        self.events.enqueue(event);
    }

    pub fn snapshot(&self) -> Snapshot {
        serializer::serialize_game(self)
    }

    fn accepts_name(&self, name: &str) -> bool {
        if name.chars().count() < self.config.min_name_length {
            warn!("Rejecting join: name {:?} is too short", name);
            return false;
        }
        if self.players.contains_key(name) {
            warn!("Rejecting join: name {:?} is already taken", name);
            return false;
        }
        true
    }

    /// Joins a new player at a free spot. Returns `None`, changing nothing,
    /// when the name is too short or taken, or the arena has no free spot.
    pub fn initialize_player(&mut self, name: &str) -> Option<&Player> {
        if !self.accepts_name(name) {
            return None;
        }

        let Some((spawn, heading)) = self.find_spawn_point() else {
            warn!("Rejecting join for {}: no free spawn point", name);
            return None;
        };

        self.insert_player(name, spawn, heading)
    }

    /// Joins a new player at an explicit position and heading.
    pub fn initialize_player_at(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        heading: i32,
    ) -> Option<&Player> {
        if !self.accepts_name(name) {
            return None;
        }

        let spawn = Circle::new(x, y, self.config.snake_radius);
        if !spawn.contained_in(&self.arena) {
            warn!("Rejecting join for {}: ({}, {}) is outside the arena", name, x, y);
            return None;
        }

        self.insert_player(name, spawn, heading)
    }

    fn insert_player(&mut self, name: &str, spawn: Circle, heading: i32) -> Option<&Player> {
        let hash = format!("{:016x}", self.rng.gen::<u64>());
        let player = Player::new(
            name.to_string(),
            hash,
            spawn,
            heading,
            self.config.angle_per_tick,
        );

        info!(
            "Player {} joined at ({:.1}, {:.1}) heading {}",
            name,
            spawn.x,
            spawn.y,
            player.snake.heading()
        );
        self.join_order.push(name.to_string());
        self.players.insert(name.to_string(), player);
        self.players.get(name)
    }

    /// Removes a player entirely. Pending events for it are dropped on drain.
    pub fn remove_player(&mut self, name: &str) -> bool {
        if self.players.remove(name).is_none() {
            return false;
        }
        self.join_order.retain(|n| n != name);
        info!("Player {} left", name);
        true
    }

    fn is_free(&self, candidate: &Circle) -> bool {
        let clearance = self.config.spawn_clearance;
        let padded = Circle::new(candidate.x, candidate.y, candidate.radius + clearance);

        padded.contained_in(&self.arena)
            && self
                .players
                .values()
                .all(|p| !p.snake.is_near(candidate, clearance))
    }

    /// Arena center first, then random points. Random spawns face the center.
    fn find_spawn_point(&mut self) -> Option<(Circle, i32)> {
        let radius = self.config.snake_radius;
        let (cx, cy) = self.arena.center();

        let center = Circle::new(cx, cy, radius);
        if self.is_free(&center) {
            return Some((center, 0));
        }

        let margin = (radius + self.config.spawn_clearance).min(cx.min(cy));
        for _ in 0..self.config.spawn_attempts {
            let x = self.rng.gen_range(margin..=self.arena.width() - margin);
            let y = self.rng.gen_range(margin..=self.arena.height() - margin);
            let candidate = Circle::new(x, y, radius);

            if self.is_free(&candidate) {
                let heading = (cx - x).atan2(cy - y).to_degrees().round() as i32;
                return Some((candidate, normalize_heading(heading)));
            }
        }
        None
    }

    fn apply_event(&mut self, event: Event) -> bool {
        let Some(player) = self.players.get_mut(&event.player_name) else {
            debug!("Dropping input for unknown player {}", event.player_name);
            return false;
        };
        if !player.is_alive() {
            debug!("Dropping input for eliminated player {}", event.player_name);
            return false;
        }

        let changed = player.apply_input(event.direction, event.pressed);
        if !changed {
            debug!(
                "Ignored {:?} (pressed: {}) from {}",
                event.direction, event.pressed, event.player_name
            );
        }
        changed
    }

    /// Tests every live head, in join order, against the arena bounds, its
    /// own trail, and every other snake that was alive when the pass began.
    fn detect_collisions(&self) -> Vec<(String, Elimination)> {
        let grace = self.config.self_collision_grace;
        let contenders: Vec<&Player> = self.players().filter(|p| p.is_alive()).collect();

        let mut eliminated = Vec::new();
        for player in &contenders {
            let head = player.snake.head();

            let cause = if !head.contained_in(&self.arena) {
                Some(Elimination::Boundary)
            } else if player.snake.hits_own_trail(grace) {
                Some(Elimination::OwnTrail)
            } else {
                contenders
                    .iter()
                    .find(|other| other.name != player.name && other.snake.hits(head))
                    .map(|other| Elimination::Snake(other.name.clone()))
            };

            if let Some(cause) = cause {
                eliminated.push((player.name.clone(), cause));
            }
        }
        eliminated
    }

    /// Advances the world by one step and notifies tick listeners.
    pub fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();

        for event in self.events.drain_all() {
            if self.apply_event(event) {
                summary.events_applied += 1;
            }
        }

        let step = self.config.step_distance;
        for name in &self.join_order {
            if let Some(player) = self.players.get_mut(name) {
                if player.is_alive() {
                    player.advance(step);
                }
            }
        }

        summary.eliminated = self.detect_collisions();
        for (name, cause) in &summary.eliminated {
            if let Some(player) = self.players.get_mut(name) {
                player.snake.kill();
                info!("Player {} {} (score {})", name, cause, player.score);
            }
        }

        let points = self.config.score_per_tick;
        for player in self.players.values_mut() {
            player.award(points);
        }

        self.tick += 1;
        summary.tick = self.tick;

        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(&*self);
        }
        self.listeners = listeners;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use snake_shared::Direction;
    use std::sync::{Arc, Mutex};

    fn game() -> Game {
        Game::new(GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Game::new(GameConfig {
            step_distance: 0.0,
            ..GameConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_first_player_spawns_at_center() {
        let mut game = game();
        let player = game.initialize_player("alice").unwrap();

        assert_eq!(player.snake.head(), &Circle::new(50.0, 50.0, 2.0));
        assert_eq!(player.snake.heading(), 0);
        assert_eq!(player.hash.len(), 16);
        assert_eq!(game.player_count(), 1);
    }

    #[test]
    fn test_join_rejections_leave_players_unchanged() {
        let mut game = game();
        assert!(game.initialize_player("ab").is_none());
        assert_eq!(game.player_count(), 0);

        assert!(game.initialize_player("alice").is_some());
        assert!(game.initialize_player("alice").is_none());
        assert_eq!(game.player_count(), 1);

        assert!(game.initialize_player_at("bob", 500.0, 50.0, 0).is_none());
        assert_eq!(game.player_count(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut game = game();
        assert!(game.initialize_player("alice").is_some());
        assert!(game.initialize_player("Alice").is_some());
        assert_eq!(game.player_count(), 2);
    }

    #[test]
    fn test_later_players_spawn_away_from_others() {
        let mut game = game();
        game.initialize_player("alice").unwrap();
        let bob = game.initialize_player("bob").unwrap().snake.head().to_owned();
        let alice = game.get_player_by_name("alice").unwrap();

        assert!(!alice.snake.is_near(&bob, 10.0));
        assert!(Circle::new(bob.x, bob.y, 12.0).contained_in(game.arena()));
    }

    #[test]
    fn test_spawn_fails_when_arena_is_full() {
        let mut game = Game::new(GameConfig {
            arena_width: 30.0,
            arena_height: 30.0,
            spawn_attempts: 8,
            seed: Some(1),
            ..GameConfig::default()
        })
        .unwrap();

        assert!(game.initialize_player("alice").is_some());
        assert!(game.initialize_player("bob").is_none());
        assert_eq!(game.player_count(), 1);
    }

    #[test]
    fn test_tick_moves_and_turns() {
        let mut game = game();
        game.initialize_player("alice").unwrap();

        game.tick();
        let alice = game.get_player_by_name("alice").unwrap();
        assert_approx_eq!(alice.snake.head().x, 50.0);
        assert_approx_eq!(alice.snake.head().y, 55.0);
        assert_eq!(alice.snake.heading(), 0);

        game.add_event(Event::new("alice", Direction::Left, true));
        game.tick();
        let alice = game.get_player_by_name("alice").unwrap();
        assert_eq!(alice.snake.heading(), 10);
        assert_approx_eq!(alice.snake.head().x, 50.0 + 5.0 * 10f64.to_radians().sin());
        assert_approx_eq!(alice.snake.head().y, 55.0 + 5.0 * 10f64.to_radians().cos());
        assert_eq!(game.tick_count(), 2);
    }

    #[test]
    fn test_events_for_unknown_players_are_dropped() {
        let mut game = game();
        game.initialize_player("alice").unwrap();
        game.add_event(Event::new("nobody", Direction::Left, true));

        let summary = game.tick();
        assert_eq!(summary.events_applied, 0);
        assert!(game.event_queue().is_empty());
    }

    #[test]
    fn test_boundary_exit_eliminates_and_freezes() {
        let mut game = game();
        game.initialize_player_at("alice", 50.0, 93.0, 0).unwrap();

        let summary = game.tick();
        assert!(summary.eliminated.is_empty());

        let summary = game.tick();
        assert_eq!(
            summary.eliminated,
            vec![("alice".to_string(), Elimination::Boundary)]
        );

        let head = *game.get_player_by_name("alice").unwrap().snake.head();
        game.tick();
        let alice = game.get_player_by_name("alice").unwrap();
        assert!(!alice.is_alive());
        assert_eq!(alice.snake.head(), &head);
    }

    #[test]
    fn test_head_on_collision_eliminates_both() {
        let mut game = game();
        game.initialize_player_at("alice", 50.0, 30.0, 0).unwrap();
        game.initialize_player_at("bob", 50.0, 42.0, 180).unwrap();

        let summary = game.tick();

        assert_eq!(summary.eliminated.len(), 2);
        assert!(!game.get_player_by_name("alice").unwrap().is_alive());
        assert!(!game.get_player_by_name("bob").unwrap().is_alive());
    }

    #[test]
    fn test_running_into_trail_eliminates_only_the_runner() {
        let mut game = game();
        game.initialize_player_at("alice", 20.0, 50.0, 90).unwrap();
        for _ in 0..8 {
            game.tick();
        }
        // alice's trail now spans x = 20..55 along y = 50.
        game.initialize_player_at("bob", 40.0, 40.0, 0).unwrap();

        let summary = game.tick();
        assert!(summary.eliminated.is_empty());
        let summary = game.tick();

        assert_eq!(
            summary.eliminated,
            vec![("bob".to_string(), Elimination::Snake("alice".to_string()))]
        );
        assert!(game.get_player_by_name("alice").unwrap().is_alive());
    }

    #[test]
    fn test_snake_dying_this_tick_still_blocks_others() {
        let mut game = game();
        // alice exits the left wall; bob's head lands on the segment she
        // just left behind.
        game.initialize_player_at("alice", 4.0, 50.0, 270).unwrap();
        game.initialize_player_at("bob", 4.0, 43.0, 0).unwrap();

        let summary = game.tick();

        assert_eq!(
            summary.eliminated,
            vec![
                ("alice".to_string(), Elimination::Boundary),
                ("bob".to_string(), Elimination::Snake("alice".to_string())),
            ]
        );
    }

    #[test]
    fn test_snake_dead_from_earlier_tick_is_not_an_obstacle() {
        let mut game = game();
        game.initialize_player_at("alice", 4.0, 50.0, 270).unwrap();
        game.tick();
        assert!(!game.get_player_by_name("alice").unwrap().is_alive());

        // Two ticks put bob's head right on alice's trail at (4, 50).
        game.initialize_player_at("bob", 4.0, 40.0, 0).unwrap();
        game.tick();
        let summary = game.tick();

        assert!(summary.eliminated.is_empty());
        let bob = game.get_player_by_name("bob").unwrap();
        assert!(bob.is_alive());
        assert_approx_eq!(bob.snake.head().y, 50.0);
    }

    #[test]
    fn test_scores_accrue_only_while_alive() {
        let mut game = game();
        game.initialize_player("alice").unwrap();
        game.initialize_player_at("bob", 50.0, 93.0, 0).unwrap();

        for _ in 0..3 {
            game.tick();
        }

        assert_eq!(game.get_player_by_name("alice").unwrap().score, 3);
        assert_eq!(game.get_player_by_name("bob").unwrap().score, 1);
        assert_eq!(game.player_count(), 2);
        assert_eq!(game.alive_count(), 1);
    }

    #[test]
    fn test_remove_player() {
        let mut game = game();
        game.initialize_player("alice").unwrap();
        game.add_event(Event::new("alice", Direction::Left, true));

        assert!(game.remove_player("alice"));
        assert!(!game.remove_player("alice"));
        assert_eq!(game.players().count(), 0);

        let summary = game.tick();
        assert_eq!(summary.events_applied, 0);
    }

    #[test]
    fn test_tick_listeners_run_in_order() {
        let mut game = game();
        game.initialize_player("alice").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second"] {
            let seen = Arc::clone(&seen);
            game.on_tick(move |game| {
                seen.lock().unwrap().push((label, game.tick_count()));
            });
        }

        game.tick();
        game.tick();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn test_players_iterate_in_join_order() {
        let mut game = game();
        for name in ["carol", "alice", "bob"] {
            game.initialize_player(name).unwrap();
        }
        let names: Vec<&str> = game.players().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }
}
