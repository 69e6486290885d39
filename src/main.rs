//! bard-server
//!
//! Runs the audience server and a performer console on stdin.
//!
//! ```text
//!   audience phones ──HTTP──▶ BardServer ──▶ Session ◀── console (stdin)
//!                                 │                          │
//!                                 └────────▶ SongStore ◀─────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use bard_server::config::{load_config, validate_config, ConfigError, ServerConfig};
use bard_server::console::{parse_line, Console, Reply};
use bard_server::lifecycle::signals::shutdown_signal;
use bard_server::lifecycle::startup::open_store;
use bard_server::net::interfaces::display_address;
use bard_server::observability::{logging, metrics};
use bard_server::BardServer;

#[derive(Debug, Parser)]
#[command(name = "bard-server", version, about = "Lyrics, song votes and reactions for a live audience")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,

    /// Connections served concurrently
    #[arg(long)]
    pool_size: Option<usize>,

    /// JSON file holding the song catalogue
    #[arg(long)]
    songs: Option<String>,
}

fn resolve_config(args: &Args) -> Result<ServerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(pool_size) = args.pool_size {
        config.listener.pool_size = pool_size;
    }
    if let Some(songs) = &args.songs {
        config.store.path = Some(songs.clone());
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bard-server starting");

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let store = Arc::new(open_store(&config.store)?);
    let mut server = BardServer::new(config, store.clone());
    let local_addr = server.start().await?;

    let console = Console::new(server.session(), store, local_addr);
    println!("Audience page: http://{}/", display_address(local_addr));
    println!("Commands: songs, play <id>, finish, votes, reactions, address, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: keep serving until a signal arrives
                    (&mut signal).await;
                    break;
                };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(command)) => match console.execute(command) {
                        Ok(Reply::Text(text)) => println!("{text}"),
                        Ok(Reply::Quit) => break,
                        Err(e) => println!("error: {e}"),
                    },
                    Err(message) => print!("{message}"),
                }
            }
        }
    }

    server.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
