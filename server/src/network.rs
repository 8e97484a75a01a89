//! UDP transport and the fixed-rate tick loop.
//!
//! Incoming datagrams are decoded on a receiver task. Directional actions go
//! straight into the game's event queue from that task; everything else is
//! handed to the main loop, which is the only place the `Game` is mutated.
//! Ticks publish their snapshot through an `on_tick` listener that feeds the
//! sender task.

use crate::client_manager::ClientManager;
use crate::config::{GameConfig, CLIENT_TIMEOUT, TIMEOUT_CHECK_INTERVAL};
use crate::events::{Event, EventQueue};
use crate::game::Game;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use snake_shared::{Packet, MAX_CLIENT_PACKET_SIZE, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, MissedTickBehavior};

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { player_name: String },
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet },
}

/// What the receiver task does with a decoded packet.
#[derive(Debug, PartialEq)]
enum Routing {
    Enqueue(Event),
    Refresh,
    Forward,
    Drop,
}

/// Routes a packet without touching the game. Actions are only accepted from
/// the address that joined under the named player.
fn route_packet(packet: &Packet, addr: SocketAddr, clients: &ClientManager) -> Routing {
    match packet {
        Packet::Action {
            player_name,
            direction,
            pressed,
        } => {
            if player_name.is_empty() {
                debug!("Dropping action without player name from {}", addr);
                return Routing::Drop;
            }
            if !clients.owns_player(addr, player_name) {
                debug!("Dropping action for {} from {}", player_name, addr);
                return Routing::Drop;
            }
            Routing::Enqueue(Event::new(player_name.clone(), *direction, *pressed))
        }
        Packet::Heartbeat => Routing::Refresh,
        Packet::Join { .. } | Packet::Leave => Routing::Forward,
        _ => {
            warn!("Unexpected packet type from client at {}", addr);
            Routing::Drop
        }
    }
}

/// Main server coordinating networking and game simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    game: Game,
    events: EventQueue,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: Option<mpsc::UnboundedReceiver<GameMessage>>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
        config: GameConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut game = Game::new(config)?;
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        let tick_tx = game_tx.clone();
        game.on_tick(move |game| {
            let packet = Packet::Tick(game.snapshot());
            if let Err(e) = tick_tx.send(GameMessage::BroadcastPacket { packet }) {
                error!("Failed to queue tick broadcast: {}", e);
            }
        });

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            events: game.event_queue(),
            game,
            tick_duration,
            server_tx,
            server_rx,
            game_tx,
            game_rx: Some(game_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let events = self.events.clone();
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; MAX_CLIENT_PACKET_SIZE];

            loop {
                let (len, addr) = match socket.recv_from(&mut buffer).await {
                    Ok(received) => received,
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                };

                let packet = match deserialize::<Packet>(&buffer[..len]) {
                    Ok(packet) => packet,
                    Err(_) => {
                        warn!("Failed to deserialize packet from {}", addr);
                        continue;
                    }
                };

                let routing = {
                    let clients = clients.read().await;
                    route_packet(&packet, addr, &clients)
                };

                match routing {
                    Routing::Enqueue(event) => {
                        clients.write().await.refresh(addr);
                        events.enqueue(event);
                    }
                    Routing::Refresh => {
                        clients.write().await.refresh(addr);
                    }
                    Routing::Forward => {
                        if let Err(e) = server_tx.send(ServerMessage::PacketReceived { packet, addr })
                        {
                            error!("Failed to send packet to main loop: {}", e);
                            break;
                        }
                    }
                    Routing::Drop => {}
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let Some(mut game_rx) = self.game_rx.take() else {
            return;
        };
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);

        tokio::spawn(async move {
            let mut broadcast_failing = false;

            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet } => {
                        let client_addrs = clients.read().await.get_client_addrs();
                        if client_addrs.is_empty() {
                            continue;
                        }

                        let data = match encode_datagram(&packet) {
                            Ok(data) => {
                                broadcast_failing = false;
                                data
                            }
                            Err(e) => {
                                // Reported once until a broadcast fits again.
                                if !broadcast_failing {
                                    error!("Dropping broadcasts: {}", e);
                                    broadcast_failing = true;
                                }
                                continue;
                            }
                        };

                        for (client_id, addr) in client_addrs {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = interval(TIMEOUT_CHECK_INTERVAL);

            loop {
                interval.tick().await;

                let timed_out = clients.write().await.check_timeouts(CLIENT_TIMEOUT);

                for client in timed_out {
                    let message = ServerMessage::ClientTimeout {
                        player_name: client.player_name,
                    };
                    if let Err(e) = server_tx.send(message) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    async fn handle_join(&mut self, player_name: String, addr: SocketAddr) {
        let existing = {
            let clients = self.clients.read().await;
            clients
                .find_client_by_addr(addr)
                .map(|client| (client.id, client.player_name.clone()))
        };

        if let Some((_, current_name)) = &existing {
            if *current_name == player_name {
                // Lost `Joined` reply; answer again.
                if let Some(player) = self.game.get_player_by_name(&player_name) {
                    let packet = Packet::Joined {
                        player_name,
                        hash: player.hash.clone(),
                    };
                    self.send_packet(packet, addr);
                }
                return;
            }
        } else if self.clients.read().await.is_full() {
            let packet = Packet::Rejected {
                reason: "Server full".to_string(),
            };
            self.send_packet(packet, addr);
            return;
        }

        // The old player stays until the new join has been accepted.
        let Some(hash) = self
            .game
            .initialize_player(&player_name)
            .map(|player| player.hash.clone())
        else {
            return;
        };

        if let Some((client_id, current_name)) = existing {
            info!("Replacing {} from {} with {}", current_name, addr, player_name);
            self.clients.write().await.remove_client(&client_id);
            self.game.remove_player(&current_name);
        }

        if self
            .clients
            .write()
            .await
            .add_client(addr, &player_name)
            .is_none()
        {
            self.game.remove_player(&player_name);
            return;
        }

        self.send_packet(Packet::Joined { player_name, hash }, addr);
    }

    async fn handle_leave(&mut self, addr: SocketAddr) {
        let client_id = {
            let clients = self.clients.read().await;
            clients.find_client_by_addr(addr).map(|client| client.id)
        };

        if let Some(client_id) = client_id {
            let removed = self.clients.write().await.remove_client(&client_id);
            if let Some(client) = removed {
                self.game.remove_player(&client.player_name);
            }
        }
    }

    /// Processes packets forwarded by the receiver task
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Join { player_name } => self.handle_join(player_name, addr).await,
            Packet::Leave => self.handle_leave(addr).await,
            _ => warn!("Unexpected packet type from client at {}", addr),
        }
    }

    /// Main server loop: handles joins and departures between ticks and runs
    /// the game at the configured rate.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        }
                        Some(ServerMessage::ClientTimeout { player_name }) => {
                            self.game.remove_player(&player_name);
                        }
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    let summary = self.game.tick();

                    if summary.tick % 100 == 0 {
                        debug!(
                            "Tick {}: {} players ({} alive), {} inputs applied",
                            summary.tick,
                            self.game.player_count(),
                            self.game.alive_count(),
                            summary.events_applied
                        );
                    }
                },
            }
        }

        Ok(())
    }
}

async fn send_packet_impl(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = encode_datagram(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

/// Encodes a packet for a single datagram, failing if it would not fit.
fn encode_datagram(packet: &Packet) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    if data.len() > MAX_DATAGRAM_SIZE {
        return Err(format!(
            "encoded {} bytes, over the {} byte datagram limit",
            data.len(),
            MAX_DATAGRAM_SIZE
        )
        .into());
    }
    Ok(data)
}
