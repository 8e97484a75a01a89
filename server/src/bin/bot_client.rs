//! Headless client that joins the arena and steers at random.
//!
//! Handy for soak-testing a running server with a few extra snakes.

use bincode::{deserialize, serialize};
use clap::Parser;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_shared::{Direction, Packet, Snapshot, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, sleep, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:7777")]
    server: String,

    /// Player name to join under
    #[arg(short = 'n', long, default_value = "bot")]
    name: String,

    /// Stop after this many seconds
    #[arg(short = 'd', long, default_value = "60")]
    duration: u64,

    /// Milliseconds between steering decisions
    #[arg(long, default_value = "250")]
    decision_ms: u64,
}

struct Bot {
    socket: UdpSocket,
    server_addr: SocketAddr,
    name: String,
    joined: bool,
    held: Option<Direction>,
    alive: bool,
    rng: StdRng,
}

impl Bot {
    async fn new(server_addr: &str, name: String) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Bot {
            socket,
            server_addr,
            name,
            joined: false,
            held: None,
            alive: true,
            rng: StdRng::from_entropy(),
        })
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    async fn send_key(
        &self,
        direction: Direction,
        pressed: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let packet = Packet::Action {
            player_name: self.name.clone(),
            direction,
            pressed,
        };
        self.send_packet(&packet).await
    }

    /// Releases whatever is held, then maybe presses a new key.
    async fn steer(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(direction) = self.held.take() {
            self.send_key(direction, false).await?;
        }

        let next = match self.rng.gen_range(0..3) {
            0 => Some(Direction::Left),
            1 => Some(Direction::Right),
            _ => None,
        };

        if let Some(direction) = next {
            self.send_key(direction, true).await?;
            self.held = Some(direction);
        }
        Ok(())
    }

    fn handle_snapshot(&mut self, snapshot: &Snapshot) {
        let Some(me) = snapshot.player(&self.name) else {
            return;
        };

        if self.alive && !me.alive {
            self.alive = false;
            info!(
                "Eliminated at tick {} with score {} ({} of {} still alive)",
                snapshot.tick,
                me.score,
                snapshot.alive_count(),
                snapshot.players.len()
            );
        }

        if snapshot.tick % 100 == 0 {
            let leader = snapshot.leaderboard().first().map(|p| (p.name.clone(), p.score));
            info!(
                "Tick {}: score {}, trail {} segments, leader {:?}",
                snapshot.tick,
                me.score,
                me.trail.len(),
                leader
            );
        }
    }

    fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Joined { player_name, hash } => {
                info!("Joined as {} ({})", player_name, hash);
                self.joined = true;
            }
            Packet::Rejected { reason } => {
                warn!("Join rejected: {}", reason);
            }
            Packet::Tick(snapshot) => self.handle_snapshot(&snapshot),
            _ => warn!("Unexpected packet type"),
        }
    }

    async fn run(&mut self, duration: Duration, decision: Duration) -> Result<(), Box<dyn std::error::Error>> {
        let join = Packet::Join {
            player_name: self.name.clone(),
        };
        self.send_packet(&join).await?;

        let deadline = sleep(duration);
        tokio::pin!(deadline);

        let mut decision_interval = interval(decision);
        let mut heartbeat_interval = interval(Duration::from_secs(1));
        let mut join_retry = interval(Duration::from_secs(1));
        let started = Instant::now();

        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

        while self.alive {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => match deserialize::<Packet>(&buffer[..len]) {
                            Ok(packet) => self.handle_packet(packet),
                            Err(e) => warn!("Failed to decode packet: {}", e),
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                _ = join_retry.tick(), if !self.joined => {
                    self.send_packet(&join).await?;
                },

                _ = decision_interval.tick(), if self.joined => {
                    if let Err(e) = self.steer().await {
                        error!("Error sending input: {}", e);
                    }
                },

                _ = heartbeat_interval.tick(), if self.joined => {
                    self.send_packet(&Packet::Heartbeat).await?;
                },

                _ = &mut deadline => {
                    info!("Stopping after {:?}", started.elapsed());
                    break;
                },
            }
        }

        if self.joined {
            if let Err(e) = self.send_packet(&Packet::Leave).await {
                warn!("Failed to send leave: {}", e);
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Connecting to {} as {}", args.server, args.name);

    let mut bot = Bot::new(&args.server, args.name).await?;
    bot.run(
        Duration::from_secs(args.duration),
        Duration::from_millis(args.decision_ms.max(1)),
    )
    .await?;

    Ok(())
}
