//! Read-only conversion of engine state into the wire snapshot.

use crate::game::Game;
use crate::player::Player;
use snake_shared::{PlayerSnapshot, SegmentSnapshot, Snapshot};

pub fn serialize_player(player: &Player) -> PlayerSnapshot {
    PlayerSnapshot {
        name: player.name.clone(),
        hash: player.hash.clone(),
        score: player.score,
        alive: player.is_alive(),
        heading: player.snake.heading(),
        head: SegmentSnapshot::from(player.snake.head()),
        trail: player
            .snake
            .trail()
            .segments()
            .iter()
            .map(SegmentSnapshot::from)
            .collect(),
    }
}

pub fn serialize_game(game: &Game) -> Snapshot {
    Snapshot {
        tick: game.tick_count(),
        arena_width: game.arena().width(),
        arena_height: game.arena().height(),
        players: game.players().map(serialize_player).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_empty_game() {
        let game = Game::new(GameConfig::default()).unwrap();
        let snapshot = serialize_game(&game);

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.arena_width, 100.0);
        assert_eq!(snapshot.arena_height, 100.0);
        assert!(snapshot.players.is_empty());
    }

    #[test]
    fn test_snapshot_after_ticks() {
        let mut game = Game::new(GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        })
        .unwrap();
        game.initialize_player("alice").unwrap();
        game.tick();
        game.tick();

        let snapshot = serialize_game(&game);
        assert_eq!(snapshot.tick, 2);

        let alice = snapshot.player("alice").unwrap();
        assert_eq!(alice.score, 2);
        assert!(alice.alive);
        assert_eq!(alice.trail.len(), 2);
        assert_approx_eq!(alice.trail[0].y, 50.0);
        assert_approx_eq!(alice.trail[1].y, 55.0);
        assert_approx_eq!(alice.head.y, 60.0);
        assert_approx_eq!(alice.head.radius, 2.0);
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let mut game = Game::new(GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        })
        .unwrap();
        game.initialize_player("alice").unwrap();
        game.initialize_player("bob").unwrap();
        game.tick();

        assert_eq!(serialize_game(&game), serialize_game(&game));
        assert_eq!(game.snapshot(), serialize_game(&game));
    }
}
