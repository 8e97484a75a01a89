use clap::Parser;
use log::info;
use snake_server::config::GameConfig;
use snake_server::network::Server;
use snake_shared::DEFAULT_PORT;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to; host names are resolved once at startup
    #[arg(short = 'H', long, env = "SNAKE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, env = "SNAKE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Ticks per second
    #[arg(short, long, default_value = "20")]
    tick_rate: u32,

    /// Maximum number of connected players
    #[arg(short, long, default_value = "32")]
    max_players: usize,

    /// Arena width in world units
    #[arg(long, default_value = "100")]
    arena_width: f64,

    /// Arena height in world units
    #[arg(long, default_value = "100")]
    arena_height: f64,

    /// Degrees turned per tick while a turn key is held
    #[arg(long, default_value = "10")]
    turn_rate: i32,

    /// Seed for spawn points and player hashes
    #[arg(long)]
    seed: Option<u64>,
}

/// Resolves a host name to an IP so clients are never handed a name they
/// might fail to look up themselves.
async fn resolve_host(host: &str, port: u16) -> Result<IpAddr, Box<dyn std::error::Error>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolved = tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| format!("could not resolve host {}", host))?;

    info!("Resolved {} to {}", host, resolved.ip());
    Ok(resolved.ip())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.tick_rate == 0 {
        return Err("tick rate must be at least 1".into());
    }

    let config = GameConfig {
        arena_width: args.arena_width,
        arena_height: args.arena_height,
        angle_per_tick: args.turn_rate,
        seed: args.seed,
        ..GameConfig::default()
    };

    let ip = resolve_host(&args.host, args.port).await?;
    let address = SocketAddr::new(ip, args.port).to_string();
    let tick_duration = Duration::from_secs_f64(1.0 / args.tick_rate as f64);

    info!(
        "Starting server: {}x{} arena, {} Hz, up to {} players",
        config.arena_width, config.arena_height, args.tick_rate, args.max_players
    );

    let mut server = Server::new(&address, tick_duration, args.max_players, config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
