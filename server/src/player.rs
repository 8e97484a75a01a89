use crate::geometry::Circle;
use crate::snake::Snake;
use snake_shared::Direction;

pub const DEFAULT_ANGLE_PER_TICK: i32 = 10;

/// A joined participant. Owns its snake; the arena is shared by the game and
/// passed in where needed rather than referenced from here.
#[derive(Debug, Clone)]
pub struct Player {
    pub hash: String,
    pub name: String,
    pub snake: Snake,
    pub score: u64,
    pub key_pressed: bool,
    /// Degrees turned per tick while a turn key is held.
    pub angle_per_tick: i32,
}

impl Player {
    pub fn new(name: String, hash: String, spawn: Circle, heading: i32, angle_per_tick: i32) -> Self {
        Self {
            hash,
            name,
            snake: Snake::new(spawn, heading),
            score: 0,
            key_pressed: false,
            angle_per_tick,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.snake.is_alive()
    }

    /// A turn is refused only when it directly opposes the turn already held.
    pub fn can_change_direction(&self, direction: Direction) -> bool {
        self.snake.direction != Some(direction.opposite())
    }

    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if !self.can_change_direction(direction) {
            return false;
        }
        self.snake.direction = Some(direction);
        true
    }

    /// Applies a key press or release. Returns whether the state changed.
    pub fn apply_input(&mut self, direction: Direction, pressed: bool) -> bool {
        if pressed {
            if !self.change_direction(direction) {
                return false;
            }
            self.key_pressed = true;
            true
        } else if self.snake.direction == Some(direction) {
            self.snake.direction = None;
            self.key_pressed = false;
            true
        } else {
            false
        }
    }

    /// Signed heading change for the coming tick. Left turns are positive.
    pub fn turn_delta(&self) -> i32 {
        if !self.key_pressed {
            return 0;
        }
        match self.snake.direction {
            Some(Direction::Left) => self.angle_per_tick,
            Some(Direction::Right) => -self.angle_per_tick,
            None => 0,
        }
    }

    pub fn advance(&mut self, distance: f64) {
        let turn = self.turn_delta();
        self.snake.advance(turn, distance);
    }

    /// Adds survival points. Dead players keep their final score.
    pub fn award(&mut self, points: u64) {
        if self.is_alive() {
            self.score = self.score.saturating_add(points);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(
            "alice".to_string(),
            "00000000deadbeef".to_string(),
            Circle::new(50.0, 50.0, 2.0),
            0,
            DEFAULT_ANGLE_PER_TICK,
        )
    }

    #[test]
    fn test_player_creation() {
        let player = player();
        assert_eq!(player.name, "alice");
        assert_eq!(player.score, 0);
        assert!(!player.key_pressed);
        assert!(player.is_alive());
        assert_eq!(player.angle_per_tick, 10);
        assert_eq!(player.snake.direction, None);
    }

    #[test]
    fn test_can_change_direction_rejects_only_opposite() {
        let mut player = player();

        assert!(player.can_change_direction(Direction::Left));
        assert!(player.can_change_direction(Direction::Right));

        player.snake.direction = Some(Direction::Left);
        assert!(player.can_change_direction(Direction::Left));
        assert!(!player.can_change_direction(Direction::Right));

        player.snake.direction = Some(Direction::Right);
        assert!(!player.can_change_direction(Direction::Left));
        assert!(player.can_change_direction(Direction::Right));
    }

    #[test]
    fn test_press_and_release() {
        let mut player = player();

        assert!(player.apply_input(Direction::Left, true));
        assert!(player.key_pressed);
        assert_eq!(player.turn_delta(), 10);

        // Opposite key is refused while left is held.
        assert!(!player.apply_input(Direction::Right, true));
        assert_eq!(player.snake.direction, Some(Direction::Left));

        // Releasing a key that is not held changes nothing.
        assert!(!player.apply_input(Direction::Right, false));
        assert!(player.key_pressed);

        assert!(player.apply_input(Direction::Left, false));
        assert!(!player.key_pressed);
        assert_eq!(player.turn_delta(), 0);

        assert!(player.apply_input(Direction::Right, true));
        assert_eq!(player.turn_delta(), -10);
    }

    #[test]
    fn test_award_stops_after_death() {
        let mut player = player();
        player.award(1);
        player.award(1);
        assert_eq!(player.score, 2);

        player.snake.kill();
        player.award(1);
        assert_eq!(player.score, 2);
    }

    #[test]
    fn test_advance_applies_turn() {
        let mut player = player();
        player.apply_input(Direction::Right, true);
        player.advance(5.0);

        assert_eq!(player.snake.heading(), 350);
        assert_eq!(player.snake.trail().len(), 1);
    }
}
