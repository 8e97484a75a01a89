//! # Snake Arena Server Library
//!
//! Authoritative simulation core for a real-time multiplayer trail game.
//! Every connected player steers a continuously moving snake around a
//! bounded arena; snakes leave a growing trail of circles behind them and are
//! eliminated when they leave the arena or run into a trail or another head.
//! Survivors score one point per tick.
//!
//! ## Architecture Design
//!
//! ### Single Writer
//! The [`game::Game`] is owned by one task and mutated only there, once per
//! tick. Player input arrives concurrently from the network but is only ever
//! appended to the [`events::EventQueue`]; the tick drains the whole queue
//! before anything moves, so each input lands in exactly one tick.
//!
//! ### Tick
//! 1. Drain queued inputs and apply them to their players
//! 2. Advance every live snake one step
//! 3. Test every live head against the arena, its own trail and the other
//!    snakes, in join order
//! 4. Award survival points
//! 5. Notify `on_tick` listeners with read-only access to the new state
//!
//! ### Transport
//! [`network::Server`] speaks bincode over UDP using the packets in
//! `snake_shared`. It owns the `Game`, handles joins and departures between
//! ticks, and broadcasts the [`serializer`] snapshot produced after each tick.
//!
//! ## Module Organization
//!
//! - `geometry`: circles and trails with overlap tests
//! - `arena`: the rectangular playing field
//! - `snake`, `player`: per-player movement and turn state
//! - `events`: the input queue shared with network tasks
//! - `game`: the engine and its tick
//! - `serializer`: engine state to wire snapshot
//! - `config`: gameplay tuning and validation
//! - `client_manager`, `network`: connections and the UDP server
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use snake_server::config::GameConfig;
//! use snake_server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 20 ticks per second, at most 16 players
//!     let mut server = Server::new(
//!         "127.0.0.1:7777",
//!         Duration::from_millis(50),
//!         16,
//!         GameConfig::default(),
//!     )
//!     .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! The engine can also be driven directly, without any networking:
//!
//! ```rust
//! use snake_server::config::GameConfig;
//! use snake_server::events::Event;
//! use snake_server::game::Game;
//! use snake_shared::Direction;
//!
//! let mut game = Game::new(GameConfig::default()).unwrap();
//! game.initialize_player("alice");
//! game.add_event(Event::new("alice", Direction::Left, true));
//! game.tick();
//!
//! let snapshot = game.snapshot();
//! assert_eq!(snapshot.player("alice").unwrap().heading, 10);
//! ```

pub mod arena;
pub mod client_manager;
pub mod config;
pub mod events;
pub mod game;
pub mod geometry;
pub mod network;
pub mod player;
pub mod serializer;
pub mod snake;
