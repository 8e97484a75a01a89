//! Connected clients and the player name each one joined under.
//!
//! A client only exists here after the game accepted its join, so an address
//! lookup doubles as the check that an inbound action really comes from the
//! player it names. Also tracks liveness for timeout cleanup and enforces the
//! server's capacity.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Name of the player this client controls
    pub player_name: String,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, player_name: String) -> Self {
        Self {
            id,
            addr,
            player_name,
            last_seen: Instant::now(),
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }

    /// Registers a client for an accepted player.
    ///
    /// Returns None if the server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr, player_name: &str) -> Option<u32> {
        if self.is_full() {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!(
            "Client {} connected from {} as {}",
            client_id, addr, player_name
        );
        self.clients
            .insert(client_id, Client::new(client_id, addr, player_name.to_string()));

        Some(client_id)
    }

    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        let client = self.clients.remove(client_id)?;
        info!("Client {} ({}) disconnected", client.id, client.player_name);
        Some(client)
    }

    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<&Client> {
        self.clients.values().find(|client| client.addr == addr)
    }

    /// Whether `addr` joined as `player_name`.
    pub fn owns_player(&self, addr: SocketAddr, player_name: &str) -> bool {
        self.find_client_by_addr(addr)
            .is_some_and(|client| client.player_name == player_name)
    }

    /// Marks the client at `addr` as active. Returns false for unknown addresses.
    pub fn refresh(&mut self, addr: SocketAddr) -> bool {
        match self.clients.values_mut().find(|client| client.addr == addr) {
            Some(client) => {
                client.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Removes and returns every client silent for longer than `timeout`.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<Client> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .iter()
            .filter_map(|client_id| self.remove_client(client_id))
            .collect()
    }

    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
