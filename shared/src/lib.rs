use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 7777;
pub const MIN_NAME_LENGTH: usize = 3;
/// Largest packet a client is expected to send.
pub const MAX_CLIENT_PACKET_SIZE: usize = 2048;
/// Largest UDP payload; tick snapshots can approach it.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Turn direction requested by a player.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Join {
        player_name: String,
    },
    Action {
        player_name: String,
        direction: Direction,
        pressed: bool,
    },
    Leave,
    Heartbeat,

    Joined {
        player_name: String,
        hash: String,
    },
    Rejected {
        reason: String,
    },
    Tick(Snapshot),
}

/// One circular trail segment as seen by clients.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SegmentSnapshot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub name: String,
    pub hash: String,
    pub score: u64,
    pub alive: bool,
    pub heading: i32,
    pub head: SegmentSnapshot,
    /// Oldest segment first.
    pub trail: Vec<SegmentSnapshot>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub arena_width: f64,
    pub arena_height: f64,
    /// Players in join order.
    pub players: Vec<PlayerSnapshot>,
}

impl Snapshot {
    pub fn player(&self, name: &str) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Players ordered by score, highest first. Ties keep join order.
    pub fn leaderboard(&self) -> Vec<&PlayerSnapshot> {
        let mut ranked: Vec<&PlayerSnapshot> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}
